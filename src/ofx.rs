//! Minimal OFX reader.
//!
//! Accepts both the SGML dialect of OFX 1.x (leaf elements without closing
//! tags, usually one per line) and the XML dialect of OFX 2.x (closing tags,
//! possibly everything on a single line). Only the parts needed to extract
//! statement transactions are interpreted; every other element is skipped.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::fmt::decode_text;

#[derive(Debug, Clone, PartialEq)]
pub struct OfxTransaction {
    pub posted: NaiveDate,
    pub amount: Decimal,
    pub name: Option<String>,
    pub memo: Option<String>,
}

impl OfxTransaction {
    /// Payee text: NAME, falling back to MEMO.
    pub fn payee(&self) -> &str {
        self.name
            .as_deref()
            .or(self.memo.as_deref())
            .unwrap_or_default()
    }

    pub fn amount_f64(&self) -> f64 {
        self.amount.to_f64().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementBody {
    pub transactions: Vec<OfxTransaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `<CCSTMTRS>` inside `<CREDITCARDMSGSRSV1>`.
    CreditCard(StatementBody),
    /// `<STMTRS>` inside `<BANKMSGSRSV1>`. Its transactions are checked but not kept.
    Bank,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfxResponse {
    pub statements: Vec<Statement>,
}

impl OfxResponse {
    pub fn credit_card(&self) -> impl Iterator<Item = &StatementBody> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::CreditCard(body) => Some(body),
            Statement::Bank => None,
        })
    }
}

#[derive(Error, Debug)]
pub enum OfxError {
    #[error("no <OFX> element found")]
    MissingRoot,
    #[error("failed to parse OFX: {0}")]
    ParseError(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

#[derive(Clone, Copy, PartialEq)]
enum StatementKind {
    CreditCard,
    Bank,
}

struct BuildingStatement {
    kind: StatementKind,
    body: StatementBody,
}

impl BuildingStatement {
    fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            body: StatementBody::default(),
        }
    }

    fn finish(self) -> Statement {
        match self.kind {
            StatementKind::CreditCard => Statement::CreditCard(self.body),
            StatementKind::Bank => Statement::Bank,
        }
    }
}

#[derive(Default)]
struct BuildingTrx {
    posted: Option<NaiveDate>,
    amount: Option<Decimal>,
    name: Option<String>,
    memo: Option<String>,
}

impl BuildingTrx {
    fn finish(self) -> Result<OfxTransaction, OfxError> {
        Ok(OfxTransaction {
            posted: self.posted.ok_or(OfxError::MissingField("DTPOSTED"))?,
            amount: self.amount.ok_or(OfxError::MissingField("TRNAMT"))?,
            name: self.name,
            memo: self.memo,
        })
    }
}

pub fn parse(data: &[u8]) -> Result<OfxResponse, OfxError> {
    parse_str(&decode_text(data))
}

pub fn parse_str(content: &str) -> Result<OfxResponse, OfxError> {
    let mut response = OfxResponse::default();
    let mut saw_root = false;
    let mut statement: Option<BuildingStatement> = None;
    let mut trx: Option<BuildingTrx> = None;

    // Anything before the first '<' is the OFX 1.x colon-separated header.
    for chunk in content.split('<').skip(1) {
        let (tag, text) = chunk
            .split_once('>')
            .ok_or_else(|| OfxError::ParseError(format!("unterminated tag <{}", chunk.trim())))?;
        // `<OFX xmlns="...">`: only the element name matters.
        let tag = tag.split_whitespace().next().unwrap_or_default().to_ascii_uppercase();
        if tag.starts_with('?') || tag.starts_with('!') {
            continue;
        }
        let value = text.trim();

        match tag.as_str() {
            "OFX" => saw_root = true,
            "CCSTMTRS" => statement = Some(BuildingStatement::new(StatementKind::CreditCard)),
            "STMTRS" => statement = Some(BuildingStatement::new(StatementKind::Bank)),
            "/CCSTMTRS" | "/STMTRS" => {
                if let Some(done) = statement.take() {
                    response.statements.push(done.finish());
                }
            }
            "STMTTRN" => trx = Some(BuildingTrx::default()),
            "/STMTTRN" => {
                if let (Some(done), Some(stmt)) = (trx.take(), statement.as_mut()) {
                    stmt.body.transactions.push(done.finish()?);
                }
            }
            _ => {
                if value.is_empty() || tag.starts_with('/') {
                    continue;
                }
                if let Some(t) = trx.as_mut() {
                    match tag.as_str() {
                        "DTPOSTED" => t.posted = Some(parse_ofx_date(value)?),
                        "TRNAMT" => t.amount = Some(parse_ofx_amount(value)?),
                        "NAME" => t.name = Some(unescape(value)),
                        "MEMO" => t.memo = Some(unescape(value)),
                        _ => {}
                    }
                }
            }
        }
    }

    if !saw_root {
        return Err(OfxError::MissingRoot);
    }
    if statement.is_some() || trx.is_some() {
        return Err(OfxError::ParseError("unterminated statement".to_string()));
    }
    Ok(response)
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn parse_ofx_date(s: &str) -> Result<NaiveDate, OfxError> {
    let invalid = || OfxError::InvalidDate(s.to_string());
    let digits = s.get(0..8).ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let y: i32 = digits[0..4].parse().map_err(|_| invalid())?;
    let m: u32 = digits[4..6].parse().map_err(|_| invalid())?;
    let d: u32 = digits[6..8].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

// OFX allows either '.' or ',' as the decimal separator and no grouping.
fn parse_ofx_amount(s: &str) -> Result<Decimal, OfxError> {
    let normalized = s.trim().replace(',', ".");
    let normalized = normalized.strip_prefix('+').unwrap_or(&normalized);
    Decimal::from_str(normalized).map_err(|_| OfxError::InvalidAmount(s.to_string()))
}
