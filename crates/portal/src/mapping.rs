// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field mapping table.
//!
//! Translates internal category and document-type codes into the exact option
//! labels the portal renders. The protocol selects options by exact label, so
//! these strings must match the portal byte for byte.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown deduction category code '{0}'")]
    UnknownCategory(String),
    #[error("unknown document type code '{0}'")]
    UnknownDocumentType(String),
}

const CATEGORIES: &[(&str, &str)] = &[
    ("MEDICAL", "Médicos no Brasil"),
    ("DENTAL", "Dentistas no Brasil"),
    ("PSYCHOLOGY", "Psicólogos no Brasil"),
    ("PHYSIOTHERAPY", "Fisioterapeutas no Brasil"),
    ("SPEECH_THERAPY", "Fonoaudiólogos no Brasil"),
    ("OCCUPATIONAL_THERAPY", "Terapeutas ocupacionais no Brasil"),
    ("HOSPITAL", "Hospitais, clínicas e laboratórios no Brasil"),
    ("HEALTH_PLAN", "Planos de saúde no Brasil"),
    ("EDUCATION", "Instrução no Brasil"),
    ("PRIVATE_PENSION", "Previdência complementar"),
    ("ALIMONY", "Pensão alimentícia judicial"),
];

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("RECEIPT", "Recibo"),
    ("INVOICE", "Nota fiscal"),
    ("PAYMENT_SLIP", "Boleto bancário"),
    ("BANK_STATEMENT", "Extrato bancário"),
    ("CONTRACT", "Contrato"),
];

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    let code = code.trim();
    table
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, label)| *label)
}

/// Portal label for a deduction category code.
pub fn category_label(code: &str) -> Result<&'static str, MappingError> {
    lookup(CATEGORIES, code).ok_or_else(|| MappingError::UnknownCategory(code.to_string()))
}

/// Portal label for a document type code.
pub fn document_type_label(code: &str) -> Result<&'static str, MappingError> {
    lookup(DOCUMENT_TYPES, code).ok_or_else(|| MappingError::UnknownDocumentType(code.to_string()))
}

/// All category labels, in table order.
pub fn category_labels() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|(_, label)| *label)
}

/// All document type labels, in table order.
pub fn document_type_labels() -> impl Iterator<Item = &'static str> {
    DOCUMENT_TYPES.iter().map(|(_, label)| *label)
}

/// Format cents the way the portal's amount mask expects (`1.234,56`).
pub fn format_amount(cents: u64) -> String {
    let units = (cents / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, c) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{},{:02}", grouped, cents % 100)
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
