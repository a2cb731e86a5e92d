//! PrettyXML - Fast single-pass XML pretty printing
//!
//! Reformats XML documents with indentation, optionally reformatting markup
//! embedded in CDATA, comments and escaped text, truncating long bodies,
//! and redacting or removing subtrees selected by path filters.
//!
//! Entry points:
//! - `pretty_print`: one-shot formatting with a cached printer
//! - `printer_new` / `printer_process`: reusable printer resource
//! - `printer_process_batch`: parallel formatting of many documents

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod config;
pub mod core;
pub mod error;
pub mod filter;
pub mod printer;
pub mod reader;
pub mod resource;
pub mod strategy;
pub mod term;

pub use config::{PrettyPrinterBuilder, PrinterConfig};
pub use error::ConfigError;
pub use printer::PrettyPrinter;

use resource::{cached_printer, PrinterRef, PrinterResource};
use term::{config_error_to_term, config_to_term, decode_config, output_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// One-Shot Formatting
// ============================================================================

/// Format a document with the printer for `opts`.
/// Returns {:ok, binary}, :error, or {:error, reason} for bad options
#[rustler::nif]
fn pretty_print<'a>(env: Env<'a>, input: Binary<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let config = decode_config(opts)?;
    match cached_printer(config) {
        Ok(printer) => Ok(output_to_term(env, printer.format(input.as_slice()))),
        Err(e) => Ok(config_error_to_term(env, &e)),
    }
}

// ============================================================================
// Printer Resource
// ============================================================================

/// Build a reusable printer (returns {:ok, ref} or {:error, reason})
#[rustler::nif]
fn printer_new<'a>(env: Env<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let config = decode_config(opts)?;
    match PrinterResource::new(config) {
        Ok(resource) => Ok((term::ok(), ResourceArc::new(resource)).encode(env)),
        Err(e) => Ok(config_error_to_term(env, &e)),
    }
}

/// Format one document with a printer resource
#[rustler::nif]
fn printer_process<'a>(env: Env<'a>, printer_ref: PrinterRef, input: Binary<'a>) -> Term<'a> {
    output_to_term(env, printer_ref.printer.format(input.as_slice()))
}

/// Format many documents in parallel, results in input order
#[rustler::nif(schedule = "DirtyCpu")]
fn printer_process_batch<'a>(
    env: Env<'a>,
    printer_ref: PrinterRef,
    inputs: Vec<Binary<'a>>,
) -> Term<'a> {
    let slices: Vec<&[u8]> = inputs.iter().map(|input| input.as_slice()).collect();
    let results = strategy::process_parallel(&printer_ref.printer, &slices);

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(output_to_term(env, result));
    }
    list
}

/// Effective options of a printer resource
#[rustler::nif]
fn printer_info<'a>(env: Env<'a>, printer_ref: PrinterRef) -> NifResult<Term<'a>> {
    config_to_term(env, printer_ref.printer.config())
}

// ============================================================================
// NIF Initialization
// ============================================================================

// PrinterResource is registered by `#[rustler::resource_impl]` in resource.rs.
fn load(_env: Env, _info: Term) -> bool {
    true
}

rustler::init!("Elixir.PrettyXML.Native", load = load);
