//! Symbol list and price table parsing shared by every service.
//!
//! Symbols are opaque, case-sensitive strings. Lists may be separated by commas,
//! whitespace or new lines; duplicates are dropped while keeping first-seen order.

use std::io::BufRead;

use crate::error::QuoteError;
use crate::result::Result;

/// Trim a symbol and reject it if nothing is left.
pub fn validate_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(QuoteError::EmptySymbol);
    }
    Ok(symbol.to_string())
}

/// Parse a symbol list like `"BTC, ETH SBER"`.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() || symbols.iter().any(|s| s == token) {
            continue;
        }
        symbols.push(token.to_string());
    }
    symbols
}

/// Parse symbols from a buffered reader, one or more per line.
///
/// Lines starting with `#` are ignored.
pub fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut text = String::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        text.push_str(trimmed);
        text.push('\n');
    }
    Ok(parse_symbol_list(&text))
}

/// Parse an initial price table like `"SBER=275.50,BTC=95400.0"`.
///
/// Every price must be finite and strictly positive; a symbol may appear only once.
pub fn parse_price_table(raw: &str) -> Result<Vec<(String, f64)>> {
    let mut table: Vec<(String, f64)> = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (symbol, price) = entry
            .split_once('=')
            .ok_or_else(|| QuoteError::ParseSymbols(format!("expected SYMBOL=PRICE, got {entry:?}")))?;
        let symbol = validate_symbol(symbol)?;
        let price: f64 = price
            .trim()
            .parse()
            .map_err(|e| QuoteError::ParseSymbols(format!("{symbol}: {e}")))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(QuoteError::InvalidPrice { symbol, price });
        }
        if table.iter().any(|(s, _)| *s == symbol) {
            return Err(QuoteError::ParseSymbols(format!("duplicate symbol {symbol}")));
        }
        table.push((symbol, price));
    }
    if table.is_empty() {
        return Err(QuoteError::ParseSymbols("price table is empty".to_string()));
    }
    Ok(table)
}
