//! # kasir
//!
//! Command-line access to the Query Façade. Results are printed to stdout
//! as JSON; failures print the `ApiError` JSON and exit non-zero.
//!
//! ## Usage
//! ```bash
//! # Today's sales
//! kasir report
//!
//! # Sales over an inclusive date window
//! kasir report --start 2024-01-01 --end 2024-01-31
//!
//! # Sell one Laptop (ID 1) and two Tablets (ID 3)
//! kasir checkout 1:1 3:2
//!
//! # Lookups and health
//! kasir product 1
//! kasir category 1
//! kasir health
//! ```
//!
//! Configuration comes from `KASIR_*` variables (see `config.rs`); logs go to
//! stderr and follow `RUST_LOG`.

use std::env;
use std::process::ExitCode;

use serde::Serialize;
use tracing::info;

use kasir_core::CartLine;
use kasir_service::{init_tracing, ApiError, PosFacade, ServiceConfig};

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Report {
        start: Option<String>,
        end: Option<String>,
    },
    Checkout(Vec<CartLine>),
    Product(i64),
    Category(i64),
    Health,
    Help,
}

const USAGE: &str = "\
Kasir POS

Usage: kasir <COMMAND>

Commands:
  report [--start <YYYY-MM-DD> --end <YYYY-MM-DD>]  Sales report (default: today)
  checkout <PRODUCT_ID:QTY>...                      Record a sale
  product <ID>                                      Show a product
  category <ID>                                     Show a category
  health                                            Database health
  help                                              Show this help message";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => return print_result::<()>(Err(ApiError::validation(e.to_string()))),
    };

    let pos = match PosFacade::connect(&config).await {
        Ok(pos) => pos,
        Err(e) => return print_result::<()>(Err(e)),
    };
    info!(?command, "Running command");

    let code = match command {
        Command::Report { start, end } => {
            let result = if start.is_none() && end.is_none() {
                pos.daily_sales_report().await
            } else {
                pos.sales_report_by_date_range(start.as_deref(), end.as_deref())
                    .await
            };
            print_result(result)
        }
        Command::Checkout(cart) => print_result(pos.checkout(&cart).await),
        Command::Product(id) => print_result(pos.get_product(id).await),
        Command::Category(id) => print_result(pos.get_category(id).await),
        Command::Health => print_result(pos.health().await),
        Command::Help => ExitCode::SUCCESS,
    };

    pos.close().await;
    code
}

fn print_result<T: Serialize>(result: Result<T, ApiError>) -> ExitCode {
    let (json, code) = match &result {
        Ok(value) => (serde_json::to_string_pretty(value), ExitCode::SUCCESS),
        Err(err) => (serde_json::to_string_pretty(err), ExitCode::FAILURE),
    };

    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: could not encode result: {}", e);
            return ExitCode::FAILURE;
        }
    }
    code
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match name.as_str() {
        "report" => {
            let mut start = None;
            let mut end = None;
            let mut i = 0;
            while i < rest.len() {
                let value = rest
                    .get(i + 1)
                    .cloned()
                    .ok_or_else(|| format!("{} needs a value", rest[i]))?;
                match rest[i].as_str() {
                    "--start" | "-s" => start = Some(value),
                    "--end" | "-e" => end = Some(value),
                    other => return Err(format!("unknown option: {}", other)),
                }
                i += 2;
            }
            Ok(Command::Report { start, end })
        }
        "checkout" => {
            if rest.is_empty() {
                return Err("checkout needs at least one PRODUCT_ID:QTY".to_string());
            }
            rest.iter()
                .map(|item| parse_cart_line(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Checkout)
        }
        "product" => parse_id(rest).map(Command::Product),
        "category" => parse_id(rest).map(Command::Category),
        "health" => Ok(Command::Health),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown command: {}", other)),
    }
}

/// `"3:2"` is two of product 3; a bare `"3"` is one.
fn parse_cart_line(item: &str) -> Result<CartLine, String> {
    let invalid = || format!("invalid cart line: {}", item);

    let (id, qty) = match item.split_once(':') {
        Some((id, qty)) => (id, qty),
        None => (item, "1"),
    };
    let product_id = id.trim().parse().map_err(|_| invalid())?;
    let quantity = qty.trim().parse().map_err(|_| invalid())?;
    Ok(CartLine::new(product_id, quantity))
}

fn parse_id(rest: &[String]) -> Result<i64, String> {
    match rest {
        [id] => id.parse().map_err(|_| format!("invalid ID: {}", id)),
        _ => Err("expected exactly one ID".to_string()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_report_args() {
        assert_eq!(
            parse_args(&args("report")).unwrap(),
            Command::Report {
                start: None,
                end: None
            }
        );
        assert_eq!(
            parse_args(&args("report --start 2024-01-01 --end 2024-01-31")).unwrap(),
            Command::Report {
                start: Some("2024-01-01".into()),
                end: Some("2024-01-31".into())
            }
        );
        assert!(parse_args(&args("report --start")).is_err());
        assert!(parse_args(&args("report --from 2024-01-01")).is_err());
    }

    #[test]
    fn test_checkout_args() {
        assert_eq!(
            parse_args(&args("checkout 1:1 3:2 2")).unwrap(),
            Command::Checkout(vec![
                CartLine::new(1, 1),
                CartLine::new(3, 2),
                CartLine::new(2, 1),
            ])
        );
        // Quantity rules belong to the engine, not the parser
        assert_eq!(
            parse_args(&args("checkout 1:0")).unwrap(),
            Command::Checkout(vec![CartLine::new(1, 0)])
        );
        assert!(parse_args(&args("checkout")).is_err());
        assert!(parse_args(&args("checkout laptop:1")).is_err());
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(parse_args(&args("product 7")).unwrap(), Command::Product(7));
        assert_eq!(parse_args(&args("category 2")).unwrap(), Command::Category(2));
        assert_eq!(parse_args(&args("health")).unwrap(), Command::Health);
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert!(parse_args(&args("product")).is_err());
        assert!(parse_args(&args("refund 1")).is_err());
    }
}
