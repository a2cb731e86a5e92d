//! Parallel Batch Formatting
//!
//! Uses Rayon to format independent documents with one shared printer.

use rayon::prelude::*;

use crate::printer::PrettyPrinter;

/// Format every input in parallel. Results keep input order; a failed
/// document is `None` and does not affect the others.
pub fn process_parallel<I>(printer: &PrettyPrinter, inputs: &[I]) -> Vec<Option<Vec<u8>>>
where
    I: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|input| printer.format(input.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_keeps_order() {
        let printer = PrettyPrinter::builder().build().unwrap();
        let inputs: Vec<String> = (0..64).map(|i| format!("<a><n>{i}</n></a>")).collect();
        let results = process_parallel(&printer, &inputs);
        assert_eq!(results.len(), 64);
        for (i, result) in results.iter().enumerate() {
            let expected = format!("<a>\n\t<n>{i}</n>\n</a>");
            assert_eq!(result.as_deref(), Some(expected.as_bytes()));
        }
    }

    #[test]
    fn test_parallel_isolates_failures() {
        let printer = PrettyPrinter::builder().anonymize(["/a/b"]).build().unwrap();
        let inputs: [&[u8]; 3] = [b"<a><b>x</b></a>", b"<a><b></a>", b"<a><b>y</b></a>"];
        let results = process_parallel(&printer, &inputs);
        assert_eq!(results[0].as_deref(), Some(&b"<a>\n\t<b>[*****]</b>\n</a>"[..]));
        assert_eq!(results[1], None);
        assert_eq!(results[2].as_deref(), Some(&b"<a>\n\t<b>[*****]</b>\n</a>"[..]));
    }

    #[test]
    fn test_parallel_deep_documents_share_cache() {
        let printer = PrettyPrinter::builder().indentate(' ', 1).build().unwrap();
        let inputs: Vec<String> = (1..40)
            .map(|d| format!("{}{}", "<e>".repeat(d * 3), "</e>".repeat(d * 3)))
            .collect();
        let results = process_parallel(&printer, &inputs);
        assert!(results.iter().all(Option::is_some));
    }
}
