//! # Command Loop
//!
//! Line-oriented front-end over stdin.
//!
//! ```text
//! pdv> login ana@loja.com caixa Ana
//! pdv(Ana)> open 100
//! pdv(Ana)> add 7891000100103 "Cafe 500g" 10,00 3
//! pdv(Ana)> pay pix
//! pdv(Ana)> finish
//! pdv(Ana)> close 130,00 "sem diferenca"
//! ```
//!
//! Amounts accept `10`, `10.5`, `10,50`. Cart lines, payments and pending
//! discount requests can be referred to by their list number or by id.

use std::str::FromStr;

use pdv_core::cart::NewLineItem;
use pdv_core::{Money, PaymentMethod, PendingSaleStatus, Role, ValidationError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::app::App;
use crate::commands::{self, cart::CartResponse, RemoteReport};
use crate::error::ApiError;

// =============================================================================
// Parsing
// =============================================================================

/// A line that could not be turned into a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unclosed quote")]
    UnclosedQuote,

    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        email: String,
        role: Role,
        name: Option<String>,
    },
    Logout,
    Open(Money),
    Close {
        count: Money,
        notes: Option<String>,
    },
    CashStatus,
    Add(NewLineItem),
    Remove(String),
    Quantity(String, i64),
    Discount(String, Money),
    RequestDiscount(String, Money),
    Approve(String),
    Reject(String),
    Requests,
    Pay {
        method: PaymentMethod,
        /// `None` pays the remaining balance
        amount: Option<Money>,
    },
    RefreshPayment(String),
    Finish,
    MarkSale(String, PendingSaleStatus),
    Sales,
    Cart,
    Summary,
    Cash,
    Customer {
        name: String,
        document: Option<String>,
    },
    Clear,
    Offline(bool),
    Help,
    Quit,
}

const HELP: &str = "\
login EMAIL ROLE [NAME]       start a session (roles: admin, gerente, caixa, vendedor)
logout                        save and end the session
open AMOUNT                   open the cash drawer
close COUNT [NOTES]           close the cash drawer
status                        drawer status known to the backend
add CODE NAME PRICE [QTY]     add a cart line (quote names with spaces)
rm LINE                       remove a cart line
qty LINE QTY                  set a line's quantity
disc LINE AMOUNT              set a line's per-unit discount (managers)
req LINE AMOUNT               request a per-unit discount
approve REQ | reject REQ      decide a discount request (managers)
requests                      pending discount requests
pay METHOD [AMOUNT]           add a payment (cash, card, pix); default pays the rest
refresh PAYMENT               fetch a payment's gateway status
finish                        finalize and submit the sale
mark SALE_UID STATUS          set a queued sale to pending or failed
sales                         queued sales
cart | summary | cash         show cart, payment balance, drawer summary
customer [NAME] [DOCUMENT]    link a customer (no name unlinks)
clear                         discard the sale in progress
offline on|off                switch connectivity mode
help | quit";

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match head.to_lowercase().as_str() {
        "login" => match args.as_slice() {
            [email, role, name @ ..] => Command::Login {
                email: email.to_string(),
                role: Role::from_str(role)?,
                name: join(name),
            },
            _ => return Err(ParseError::Usage("login EMAIL ROLE [NAME]")),
        },
        "logout" => Command::Logout,
        "open" => match args.as_slice() {
            [amount] => Command::Open(Money::parse_decimal(amount)?),
            _ => return Err(ParseError::Usage("open AMOUNT")),
        },
        "close" => match args.as_slice() {
            [count, notes @ ..] => Command::Close {
                count: Money::parse_decimal(count)?,
                notes: join(notes),
            },
            _ => return Err(ParseError::Usage("close COUNT [NOTES]")),
        },
        "status" => Command::CashStatus,
        "add" => match args.as_slice() {
            [code, name, price] | [code, name, price, _] => Command::Add(NewLineItem {
                code: code.to_string(),
                name: name.to_string(),
                unit_price: Money::parse_decimal(price)?,
                quantity: match args.get(3) {
                    Some(qty) => parse_quantity(qty)?,
                    None => 1,
                },
            }),
            _ => return Err(ParseError::Usage("add CODE NAME PRICE [QTY]")),
        },
        "rm" | "remove" => match args.as_slice() {
            [line] => Command::Remove(line.to_string()),
            _ => return Err(ParseError::Usage("rm LINE")),
        },
        "qty" => match args.as_slice() {
            [line, qty] => Command::Quantity(line.to_string(), parse_quantity(qty)?),
            _ => return Err(ParseError::Usage("qty LINE QTY")),
        },
        "disc" => match args.as_slice() {
            [line, amount] => Command::Discount(line.to_string(), Money::parse_decimal(amount)?),
            _ => return Err(ParseError::Usage("disc LINE AMOUNT")),
        },
        "req" => match args.as_slice() {
            [line, amount] => {
                Command::RequestDiscount(line.to_string(), Money::parse_decimal(amount)?)
            }
            _ => return Err(ParseError::Usage("req LINE AMOUNT")),
        },
        "approve" => match args.as_slice() {
            [request] => Command::Approve(request.to_string()),
            _ => return Err(ParseError::Usage("approve REQ")),
        },
        "reject" => match args.as_slice() {
            [request] => Command::Reject(request.to_string()),
            _ => return Err(ParseError::Usage("reject REQ")),
        },
        "requests" => Command::Requests,
        "pay" => match args.as_slice() {
            [method] => Command::Pay {
                method: PaymentMethod::from_str(method)?,
                amount: None,
            },
            [method, amount] => Command::Pay {
                method: PaymentMethod::from_str(method)?,
                amount: Some(Money::parse_decimal(amount)?),
            },
            _ => return Err(ParseError::Usage("pay METHOD [AMOUNT]")),
        },
        "refresh" => match args.as_slice() {
            [payment] => Command::RefreshPayment(payment.to_string()),
            _ => return Err(ParseError::Usage("refresh PAYMENT")),
        },
        "finish" => Command::Finish,
        "mark" => match args.as_slice() {
            [uid, status] => Command::MarkSale(uid.to_string(), PendingSaleStatus::from_str(status)?),
            _ => return Err(ParseError::Usage("mark SALE_UID STATUS")),
        },
        "sales" => Command::Sales,
        "cart" => Command::Cart,
        "summary" => Command::Summary,
        "cash" => Command::Cash,
        "customer" => match args.as_slice() {
            [] => Command::Customer {
                name: String::new(),
                document: None,
            },
            [name] => Command::Customer {
                name: name.to_string(),
                document: None,
            },
            [name, document] => Command::Customer {
                name: name.to_string(),
                document: Some(document.to_string()),
            },
            _ => return Err(ParseError::Usage("customer [NAME] [DOCUMENT]")),
        },
        "clear" => Command::Clear,
        "offline" => match args.as_slice() {
            [flag] => match flag.to_lowercase().as_str() {
                "on" | "true" | "1" => Command::Offline(true),
                "off" | "false" | "0" => Command::Offline(false),
                _ => return Err(ParseError::Usage("offline on|off")),
            },
            _ => return Err(ParseError::Usage("offline on|off")),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Splits on whitespace, keeping `"quoted text"` together.
fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if in_quotes {
        return Err(ParseError::UnclosedQuote);
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_quantity(text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number".to_string(),
        })
}

fn join(words: &[&str]) -> Option<String> {
    let joined = words.join(" ");
    (!joined.trim().is_empty()).then_some(joined)
}

// =============================================================================
// Execution
// =============================================================================

/// Runs a command and renders its result for the operator.
///
/// `Quit` is handled by [`run_loop`] and renders nothing here.
pub async fn execute(app: &App, command: Command) -> Result<String, ApiError> {
    let (auth, session, db, backend) = (&app.auth, &app.session, &app.db, &app.backend);
    let money = |amount: Money| app.config.format_currency(amount);

    let text = match command {
        Command::Login { email, role, name } => {
            let r = commands::auth::login(auth, session, db, &email, name.as_deref(), role).await?;
            format!(
                "Logged in as {} ({}). Drawer {}, {} line(s) restored, {} queued sale(s).",
                r.user.name, r.user.role, r.cash_status, r.restored_items, r.pending_sales
            )
        }
        Command::Logout => match commands::auth::logout(auth, session, db).await? {
            Some(user) => format!("Goodbye, {}.", user.name),
            None => "Nobody was logged in.".to_string(),
        },
        Command::Open(amount) => {
            let r = commands::cash::open_cash(auth, session, db, backend, amount).await?;
            format!("Drawer opened with {}.{}", money(r.summary.opening_amount), remote_note(&r.remote))
        }
        Command::Close { count, notes } => {
            let r = commands::cash::close_cash(auth, session, db, backend, count, notes).await?;
            format!(
                "Drawer closed. Counted {}, received {}, pending sales {}.{}",
                money(count),
                money(r.summary.received),
                r.summary.pending_sales,
                remote_note(&r.remote)
            )
        }
        Command::CashStatus => {
            let r = commands::cash::cash_status(session, backend).await?;
            format!(
                "Local drawer {}, backend says {}.{}",
                r.local,
                r.remote.status,
                remote_note(&r.report)
            )
        }
        Command::Add(input) => {
            let cart = commands::cart::add_item(auth, session, db, input).await?;
            render_cart(app, &cart)
        }
        Command::Remove(line) => {
            let id = resolve_line(app, &line)?;
            let cart = commands::cart::remove_item(auth, session, db, &id).await?;
            render_cart(app, &cart)
        }
        Command::Quantity(line, qty) => {
            let id = resolve_line(app, &line)?;
            let cart = commands::cart::update_quantity(auth, session, db, &id, qty).await?;
            render_cart(app, &cart)
        }
        Command::Discount(line, amount) => {
            let id = resolve_line(app, &line)?;
            let cart = commands::cart::apply_discount(auth, session, db, &id, amount).await?;
            render_cart(app, &cart)
        }
        Command::RequestDiscount(line, amount) => {
            let id = resolve_line(app, &line)?;
            let r = commands::discount::request_discount(auth, session, db, &id, amount).await?;
            format!("Discount of {} per unit requested ({}).", money(amount), r.request.id)
        }
        Command::Approve(request) => {
            let id = resolve_request(app, &request)?;
            let r = commands::discount::approve_discount(auth, session, db, &id).await?;
            match r.note {
                Some(note) => format!("Not applied: {}. Request stays pending.", note),
                None => format!("Approved.\n{}", render_cart(app, &r.cart)),
            }
        }
        Command::Reject(request) => {
            let id = resolve_request(app, &request)?;
            commands::discount::reject_discount(auth, session, db, &id).await?;
            "Rejected.".to_string()
        }
        Command::Requests => {
            let pending = commands::discount::pending_discounts(session)?;
            if pending.is_empty() {
                "No pending discount requests.".to_string()
            } else {
                pending
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        format!(
                            "{:>3}. {} per unit on {} by {} [{}]",
                            i + 1,
                            money(r.per_unit),
                            r.item_id,
                            r.requested_by,
                            r.id
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::Pay { method, amount } => {
            let amount = match amount {
                Some(amount) => amount,
                None => commands::report::payment_summary(session)?.remaining,
            };
            let r = commands::payment::add_payment(auth, session, db, method, amount).await?;
            let mut text = format!(
                "{} {} received. Remaining {}.",
                method.label(),
                money(amount),
                money(r.summary.remaining)
            );
            if r.payment.change.is_positive() {
                text.push_str(&format!(" Change {}.", money(r.payment.change)));
            }
            text
        }
        Command::RefreshPayment(payment) => {
            let id = resolve_payment(app, &payment)?;
            let r = commands::payment::refresh_payment_status(auth, session, db, backend, &id)
                .await?;
            format!(
                "Payment {} is {}{}.{}",
                r.payment_id,
                r.status,
                if r.updated { " (updated)" } else { "" },
                remote_note(&r.remote)
            )
        }
        Command::Finish => {
            let r = commands::sale::finish_sale(auth, session, db, backend).await?;
            let mut text = format!(
                "Sale recorded: {} item(s), total {} [{}].{}",
                r.item_count,
                money(r.total),
                r.pending_sale.sale_uid,
                remote_note(&r.remote)
            );
            if let Some(warning) = &r.store.warning {
                text.push_str(&format!(" (not saved locally: {})", warning));
            }
            text
        }
        Command::MarkSale(uid, status) => {
            commands::sale::mark_pending_sale(auth, session, db, &uid, status).await?;
            format!("Sale {} marked {}.", uid, status_label(status))
        }
        Command::Sales => {
            let sales = commands::sale::list_pending_sales(session)?;
            if sales.is_empty() {
                "No queued sales.".to_string()
            } else {
                sales
                    .iter()
                    .map(|s| {
                        format!(
                            "{} {} {} {}",
                            s.created_at.format("%Y-%m-%d %H:%M"),
                            s.sale_uid,
                            money(s.total),
                            status_label(s.status)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Command::Cart => render_cart(app, &commands::cart::get_cart(session)?),
        Command::Summary => {
            let s = commands::report::payment_summary(session)?;
            format!(
                "Subtotal  {}\nDiscounts -{}\nTotal     {}\nPaid      {}\nRemaining {}\nChange    {}",
                money(s.subtotal),
                money(s.discount_total),
                money(s.total),
                money(s.paid),
                money(s.remaining),
                money(s.change)
            )
        }
        Command::Cash => {
            let s = commands::report::cash_summary(session)?;
            let mut lines = vec![
                format!("Drawer        {}", s.status),
                format!("Opening       {}", money(s.opening_amount)),
                format!("Received      {}", money(s.received)),
                format!("Pending sales {}", s.pending_sales),
                format!("Failed sales  {}", s.failed_sales),
            ];
            for (method, amount) in &s.by_method {
                lines.push(format!("  {:<11} {}", method.label(), money(*amount)));
            }
            lines.join("\n")
        }
        Command::Customer { name, document } => {
            let cart =
                commands::cart::set_customer(auth, session, db, &name, document.as_deref()).await?;
            match cart.customer {
                Some(c) => format!("Customer linked: {}", c.name),
                None => "Customer unlinked.".to_string(),
            }
        }
        Command::Clear => {
            commands::cart::clear_sale(auth, session, db).await?;
            "Sale cleared.".to_string()
        }
        Command::Offline(offline) => {
            commands::sale::set_offline(session, db, offline).await?;
            if offline {
                "Offline mode on.".to_string()
            } else if backend.has_online() {
                "Offline mode off.".to_string()
            } else {
                "Offline mode off, but no backend is configured.".to_string()
            }
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };

    Ok(text)
}

fn render_cart(app: &App, cart: &CartResponse) -> String {
    let money = |amount: Money| app.config.format_currency(amount);

    if cart.items.is_empty() {
        return "Cart is empty.".to_string();
    }

    let mut lines: Vec<String> = cart
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut line = format!(
                "{:>3}. {} ({}) {} x {}",
                i + 1,
                item.name,
                item.code,
                item.quantity,
                money(item.unit_price)
            );
            if item.discount_per_unit.is_positive() {
                line.push_str(&format!(" -{}", money(item.discount_per_unit)));
            }
            line.push_str(&format!(" = {}", money(item.net())));
            line
        })
        .collect();

    if let Some(customer) = &cart.customer {
        lines.push(format!("Customer: {}", customer.name));
    }
    lines.push(format!(
        "Subtotal {} | Discounts -{} | Total {}",
        money(cart.totals.subtotal),
        money(cart.totals.discount_total),
        money(cart.totals.total)
    ));
    lines.join("\n")
}

fn remote_note(report: &RemoteReport) -> String {
    match &report.warning {
        Some(warning) if !report.confirmed => format!(" (backend unavailable: {})", warning),
        _ => String::new(),
    }
}

fn status_label(status: PendingSaleStatus) -> &'static str {
    match status {
        PendingSaleStatus::Pending => "pending",
        PendingSaleStatus::Failed => "failed",
    }
}

/// A 1-based position in `ids`, or the id itself.
fn resolve(reference: &str, ids: Vec<String>) -> String {
    reference
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| ids.get(i).cloned())
        .unwrap_or_else(|| reference.to_string())
}

fn resolve_line(app: &App, reference: &str) -> Result<String, ApiError> {
    let ids: Vec<String> = app
        .session
        .with_session(|s| s.cart().items().iter().map(|i| i.id.clone()).collect())?;
    Ok(resolve(reference, ids))
}

fn resolve_payment(app: &App, reference: &str) -> Result<String, ApiError> {
    let ids: Vec<String> = app
        .session
        .with_session(|s| s.payments().entries().iter().map(|p| p.id.clone()).collect())?;
    Ok(resolve(reference, ids))
}

fn resolve_request(app: &App, reference: &str) -> Result<String, ApiError> {
    let ids: Vec<String> = app
        .session
        .with_session(|s| s.discount_requests().pending().map(|r| r.id.clone()).collect())?;
    Ok(resolve(reference, ids))
}

// =============================================================================
// Loop
// =============================================================================

fn prompt(app: &App) -> String {
    match app.auth.current_user() {
        Some(user) => format!("pdv({})> ", user.name),
        None => "pdv> ".to_string(),
    }
}

/// Reads commands until `quit` or end of input, then saves the session.
pub async fn run_loop<R, W>(app: &App, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    writer
        .write_all(format!("{} - type 'help' for commands\n", app.config.store_name).as_bytes())
        .await?;

    loop {
        writer.write_all(prompt(app).as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let reply = match parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => match execute(app, command).await {
                Ok(text) => text,
                Err(e) => format!("error: {}", e.message),
            },
            Err(e) => format!("error: {}", e),
        };

        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    if app.session.is_active() {
        if let Err(e) = commands::auth::logout(&app.auth, &app.session, &app.db).await {
            warn!(error = %e, "Could not save session on exit");
        }
    }

    writer.flush().await
}
