//! Elixir Term Conversion Utilities
//!
//! Decodes the option map into a [`PrinterConfig`] and encodes results.

use rustler::{Atom, Decoder, Encoder, Env, Error, NewBinary, NifResult, Term};

use crate::config::PrinterConfig;
use crate::error::ConfigError;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    declaration,
    indentation_character,
    indentation_multiplier,
    pretty_print_cdata,
    pretty_print_comments,
    pretty_print_text_nodes,
    robustness,
    max_text_node_length,
    max_cdata_node_length,
    ignore_whitespace,
    anonymize_filters,
    prune_filters,
}

/// Decode an option map. Missing keys and `nil` values keep the default;
/// a value of the wrong type is a `badarg`.
pub fn decode_config(opts: Term<'_>) -> NifResult<PrinterConfig> {
    if !opts.is_map() {
        return Err(Error::BadArg);
    }
    let mut config = PrinterConfig::default();

    if let Some(v) = lookup(opts, declaration())? {
        config.declaration = v;
    }
    if let Some(code) = lookup::<u32>(opts, indentation_character())? {
        config.indentation_character = char::from_u32(code).ok_or(Error::BadArg)?;
    }
    if let Some(v) = lookup(opts, indentation_multiplier())? {
        config.indentation_multiplier = v;
    }
    if let Some(v) = lookup(opts, pretty_print_cdata())? {
        config.pretty_print_cdata = v;
    }
    if let Some(v) = lookup(opts, pretty_print_comments())? {
        config.pretty_print_comments = v;
    }
    if let Some(v) = lookup(opts, pretty_print_text_nodes())? {
        config.pretty_print_text_nodes = v;
    }
    if let Some(v) = lookup(opts, robustness())? {
        config.robustness = v;
    }
    config.max_text_node_length = max_length(opts, max_text_node_length())?;
    config.max_cdata_node_length = max_length(opts, max_cdata_node_length())?;
    if let Some(v) = lookup(opts, ignore_whitespace())? {
        config.ignore_whitespace = v;
    }
    if let Some(v) = lookup(opts, anonymize_filters())? {
        config.anonymize_filters = v;
    }
    if let Some(v) = lookup(opts, prune_filters())? {
        config.prune_filters = v;
    }
    Ok(config)
}

/// Value under `key`, or `None` when absent or `nil`.
fn lookup<'a, T: Decoder<'a>>(opts: Term<'a>, key: Atom) -> NifResult<Option<T>> {
    match opts.map_get(key) {
        Ok(value) => value.decode::<Option<T>>(),
        Err(_) => Ok(None),
    }
}

/// Max length under `key`; absent, `nil` and `-1` mean unlimited.
fn max_length(opts: Term<'_>, key: Atom) -> NifResult<Option<usize>> {
    match lookup::<i64>(opts, key)? {
        Some(n) => length_limit(n),
        None => Ok(None),
    }
}

/// `-1` is unlimited, other negative values are rejected.
fn length_limit(n: i64) -> NifResult<Option<usize>> {
    match n {
        -1 => Ok(None),
        n => usize::try_from(n).map(Some).map_err(|_| Error::BadArg),
    }
}

/// Encode the effective configuration of a printer as an option map.
pub fn config_to_term<'a>(env: Env<'a>, config: &PrinterConfig) -> NifResult<Term<'a>> {
    let pairs = [
        (declaration().encode(env), config.declaration.encode(env)),
        (
            indentation_character().encode(env),
            u32::from(config.indentation_character).encode(env),
        ),
        (
            indentation_multiplier().encode(env),
            config.indentation_multiplier.encode(env),
        ),
        (pretty_print_cdata().encode(env), config.pretty_print_cdata.encode(env)),
        (pretty_print_comments().encode(env), config.pretty_print_comments.encode(env)),
        (pretty_print_text_nodes().encode(env), config.pretty_print_text_nodes.encode(env)),
        (robustness().encode(env), config.robustness.encode(env)),
        (max_text_node_length().encode(env), config.max_text_node_length.encode(env)),
        (max_cdata_node_length().encode(env), config.max_cdata_node_length.encode(env)),
        (ignore_whitespace().encode(env), config.ignore_whitespace.encode(env)),
        (anonymize_filters().encode(env), config.anonymize_filters.encode(env)),
        (prune_filters().encode(env), config.prune_filters.encode(env)),
    ];
    Term::map_from_pairs(env, &pairs)
}

/// `{:ok, binary}` for formatted output, `:error` for a rolled back call.
pub fn output_to_term<'a>(env: Env<'a>, output: Option<Vec<u8>>) -> Term<'a> {
    match output {
        Some(bytes) => (ok(), bytes_to_binary(env, &bytes)).encode(env),
        None => error().encode(env),
    }
}

/// `{:error, reason}` for a rejected configuration.
pub fn config_error_to_term<'a>(env: Env<'a>, err: &ConfigError) -> Term<'a> {
    (error(), err.to_string()).encode(env)
}

/// Convert bytes to a binary term
#[inline]
pub fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
