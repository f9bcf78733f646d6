// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dp record` - Deduction records to submit

use anyhow::Result;
use clap::{Args, Subcommand};

use dp_core::{DeductionRecord, RecordId, RecordStatus, UserId};
use dp_portal::{category_label, document_type_label, format_amount};
use dp_storage::Repository;

use crate::context::Context;
use crate::exit_error::{self, ExitError};
use crate::output::format_or_json;

#[derive(Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

#[derive(Subcommand)]
pub enum RecordCommand {
    /// Add a deduction record
    Create {
        #[arg(long)]
        user: String,

        /// Expense category code (e.g. MEDICAL)
        #[arg(long)]
        category: String,

        /// Document type code (e.g. RECEIPT)
        #[arg(long)]
        document_type: String,

        /// CPF or CNPJ of the provider
        #[arg(long)]
        provider_tax_id: String,

        /// Amount in reais, e.g. `150,00` or `150.00`
        #[arg(long, value_parser = parse_amount_cents)]
        amount: u64,
    },
    /// Show a deduction record
    Show { id: String },
}

pub async fn handle(command: RecordCommand, ctx: &Context) -> Result<()> {
    match command {
        RecordCommand::Create { user, category, document_type, provider_tax_id, amount } => {
            category_label(&category)?;
            document_type_label(&document_type)?;
            let record = DeductionRecord {
                id: RecordId::new(),
                user_id: UserId::from(user),
                category,
                document_type,
                provider_tax_id: provider_tax_id.chars().filter(char::is_ascii_digit).collect(),
                amount_cents: amount,
                status: RecordStatus::Pending,
            };
            ctx.repo.put_record(&record).await?;
            format_or_json(ctx.format, &record, || println!("{}", record.id))?;
        }
        RecordCommand::Show { id } => {
            let id = RecordId::from(id);
            let Some(record) = ctx.repo.get_record(&id).await? else {
                let message = format!("deduction record {} not found", id);
                return Err(ExitError::new(exit_error::NOT_FOUND, message).into());
            };
            format_or_json(ctx.format, &record, || {
                println!("{}", record.id);
                println!("  user:      {}", record.user_id);
                println!("  category:  {} / {}", record.category, record.document_type);
                println!("  provider:  {}", record.provider_tax_id);
                println!("  amount:    R$ {}", format_amount(record.amount_cents));
                println!("  status:    {}", record.status);
            })?;
        }
    }
    Ok(())
}

/// Parse a reais amount with `,` or `.` as decimal separator into cents.
pub(crate) fn parse_amount_cents(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let (whole, fraction) = match input.rsplit_once([',', '.']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) || fraction.len() > 2 {
        return Err(format!("not an amount: {input:?}"));
    }
    let whole: u64 = whole.parse().map_err(|_| format!("amount too large: {input:?}"))?;
    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().unwrap_or(0) * 10,
        _ => fraction.parse::<u64>().unwrap_or(0),
    };
    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .filter(|c| *c > 0)
        .ok_or_else(|| format!("not a positive amount: {input:?}"))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
