use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use kf_audit::{verify_journal, VerifyResult};
use kf_catalog::{load_layered_yaml, load_layered_yaml_from_strings, LoadedCatalog};
use kf_engine::{FulfillmentUpdate, JournalConfig, OrderEngine};
use kf_pricing::{
    FallbackOracle, LocalHeuristicOracle, PriceOracle, RemoteOracle, SkuPricingOracle,
    DEFAULT_TIMEOUT_MS,
};
use kf_schemas::{Order, PaymentMethod};
use kf_store::FileOrderRepository;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod spec_edit;

const ENV_DATA_DIR: &str = "KF_DATA_DIR";
const ENV_VENDOR_URL: &str = "KF_VENDOR_ESTIMATOR_URL";
const ENV_VENDOR_TIMEOUT_MS: &str = "KF_VENDOR_TIMEOUT_MS";
const ENV_PRICING_URL: &str = "KF_PRICING_URL";
const DEFAULT_DATA_DIR: &str = ".kioskflow";

#[derive(Parser)]
#[command(name = "kf")]
#[command(about = "Kiosk order lifecycle CLI", long_about = None)]
struct Cli {
    /// Repository root (falls back to KF_DATA_DIR, then ./.kioskflow)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog YAML layers in merge order (defaults when omitted)
    #[arg(long = "catalog", global = true)]
    catalog_paths: Vec<String>,

    /// Vendor estimator base URL (falls back to KF_VENDOR_ESTIMATOR_URL)
    #[arg(long, global = true)]
    vendor_url: Option<String>,

    /// Remote oracle timeout (falls back to KF_VENDOR_TIMEOUT_MS, then 4000)
    #[arg(long, global = true)]
    vendor_timeout_ms: Option<u64>,

    /// SKU pricing backend base URL (falls back to KF_PRICING_URL)
    #[arg(long, global = true)]
    pricing_url: Option<String>,

    /// Name recorded in audit entries
    #[arg(long = "as", global = true, default_value = "operator")]
    actor: String,

    /// Write the audit journal without the hash chain
    #[arg(long, global = true, default_value_t = false)]
    no_hash_chain: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new order and make it current
    New,

    /// Print the current order as JSON
    Show,

    /// Print the plain-text order summary
    Summary,

    /// List compliance warnings for the current order
    Validate,

    /// List stored order ids
    List,

    /// Update client details (blank flags leave fields alone)
    EditClient {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        billing_address: Option<String>,
        #[arg(long)]
        shipping_address: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Update payment details
    EditPayment {
        /// "card" or "po"
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        card_number: Option<String>,
        #[arg(long)]
        expiry: Option<String>,
        #[arg(long)]
        po_number: Option<String>,
    },

    /// Set spec fields: path=value (camelCase, dotted for nesting)
    SetSpec {
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// INTAKE -> SPEC_REVIEW
    Review,

    /// Price the spec and send the quote
    Quote,

    /// Record client acceptance of the quote
    Accept {
        /// Acceptor (defaults to the client name)
        #[arg(long)]
        by: Option<String>,
    },

    /// Record CEO approval
    Approve {
        #[arg(long, default_value = "CEO")]
        by: String,
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Record the vendor purchase order
    Vendor {
        #[arg(long)]
        vendor: String,
        #[arg(long, default_value = "")]
        po: String,
        #[arg(long, default_value = "")]
        link: String,
    },

    /// Record shipment progress; --delivered closes the order
    Fulfill {
        #[arg(long, default_value = "")]
        tracking: String,
        #[arg(long, default_value = "")]
        carrier: String,
        #[arg(long, default_value = "")]
        eta: String,
        #[arg(long, default_value_t = false)]
        delivered: bool,
    },

    /// Write the current order as JSON (stdout when --out is omitted)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the current order with an exported one
    Import { path: PathBuf },

    /// Reset the current order to catalog defaults
    Reset {
        /// Confirm the reset; the audit history is discarded.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },

    /// Print catalog hash + canonical JSON
    CatalogHash,

    /// Recently used client names
    Clients,

    /// Verify an order's audit journal hash chain
    AuditVerify {
        /// Order id (defaults to the current order)
        #[arg(long)]
        order_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let loaded = load_catalog(&cli.catalog_paths)?;

    if let Commands::CatalogHash = cli.cmd {
        println!("catalog_hash={}", loaded.catalog_hash);
        println!("{}", loaded.canonical_json);
        return Ok(());
    }

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| std::env::var(ENV_DATA_DIR).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let repo = FileOrderRepository::open(&data_dir)?;
    info!(data_dir = %data_dir.display(), catalog_hash = %loaded.catalog_hash, "repository open");

    let mut engine = OrderEngine::open(repo, loaded.catalog, build_oracle(&cli)?)
        .with_actor(cli.actor.clone())
        .with_journal(JournalConfig {
            dir: data_dir.join("audit"),
            hash_chain: !cli.no_hash_chain,
        });

    match cli.cmd {
        Commands::New => {
            let o = engine.start_new_order();
            print_status(o);
        }

        Commands::Show => println!("{}", engine.export()?),

        Commands::Summary => print!("{}", engine.summary()),

        Commands::Validate => {
            let warnings = engine.warnings();
            println!("quotable={}", warnings.is_empty());
            for w in warnings {
                println!("warning rule={} domain={} {}", w.rule_id, w.domain.as_str(), w);
            }
        }

        Commands::List => {
            let current = engine.current().order_id.clone();
            for id in engine.repository().order_ids()? {
                let mark = if id == current { "*" } else { " " };
                println!("{mark} {id}");
            }
        }

        Commands::EditClient {
            name,
            company,
            email,
            phone,
            billing_address,
            shipping_address,
            project,
            notes,
        } => {
            let o = engine.edit_client(|c| {
                set(&mut c.client_name, name);
                set(&mut c.company, company);
                set(&mut c.email, email);
                set(&mut c.phone, phone);
                set(&mut c.billing_address, billing_address);
                set(&mut c.shipping_address, shipping_address);
                set(&mut c.project_name, project);
                set(&mut c.notes, notes);
            });
            println!("client_name={}", o.client.client_name);
        }

        Commands::EditPayment {
            method,
            card_number,
            expiry,
            po_number,
        } => {
            let method = method.as_deref().map(parse_method).transpose()?;
            let o = engine.edit_payment(|p| {
                if let Some(m) = method {
                    p.method = m;
                }
                set(&mut p.card_number, card_number);
                set(&mut p.expiry, expiry);
                set(&mut p.po_number, po_number);
            });
            println!(
                "payment_method={} card_last4={}",
                o.payment.method.as_str(),
                o.payment.card_last4()
            );
        }

        Commands::SetSpec { assignments } => {
            let edited = spec_edit::apply_assignments(&engine.current().spec, &assignments)?;
            let o = engine.edit_spec(|s| *s = edited)?;
            print_status(o);
            let warnings = engine.warnings();
            println!("warnings={}", warnings.len());
        }

        Commands::Review => print_status(engine.begin_spec_review()?),

        Commands::Quote => {
            let o = engine.generate_quote().await?;
            print_status(o);
            if let Some(q) = &o.quote {
                println!(
                    "estimator={} currency={} subtotal={} shipping={} tax={} total={}",
                    q.estimator.as_str(),
                    q.currency,
                    q.subtotal,
                    q.shipping,
                    q.tax,
                    q.total
                );
            }
        }

        Commands::Accept { by } => print_status(engine.client_accept(by.as_deref())?),

        Commands::Approve { by, comment } => print_status(engine.ceo_approve(&by, &comment)?),

        Commands::Vendor { vendor, po, link } => {
            print_status(engine.place_vendor_order(&vendor, &po, &link)?)
        }

        Commands::Fulfill {
            tracking,
            carrier,
            eta,
            delivered,
        } => {
            let update = FulfillmentUpdate {
                tracking,
                carrier,
                eta,
                delivered_at: delivered.then(Utc::now),
            };
            print_status(engine.update_fulfillment(update)?);
        }

        Commands::Export { out } => {
            let raw = engine.export()?;
            match out {
                Some(path) => {
                    fs::write(&path, raw)
                        .with_context(|| format!("write export failed: {}", path.display()))?;
                    println!("exported=true path={}", path.display());
                }
                None => println!("{raw}"),
            }
        }

        Commands::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read import failed: {}", path.display()))?;
            print_status(engine.import(&raw)?);
        }

        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!(
                    "REFUSING RESET: order {} ({}) and its audit history would be discarded. Re-run with: `kf reset --yes`",
                    engine.current().order_id,
                    engine.current().status
                );
            }
            print_status(engine.full_reset());
        }

        Commands::Clients => {
            for name in engine.client_names() {
                println!("{name}");
            }
        }

        Commands::AuditVerify { order_id } => {
            let id = order_id.unwrap_or_else(|| engine.current().order_id.clone());
            let path = engine.repository().journal_path(&id)?;
            match verify_journal(&path)? {
                VerifyResult::Valid { lines } => {
                    println!("audit_valid=true order_id={id} lines={lines}");
                }
                VerifyResult::Broken { line, reason } => {
                    anyhow::bail!("audit_valid=false order_id={id} line={line} reason={reason}");
                }
            }
        }

        Commands::CatalogHash => {}
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn load_catalog(paths: &[String]) -> Result<LoadedCatalog> {
    if paths.is_empty() {
        return load_layered_yaml_from_strings(&[]);
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    load_layered_yaml(&path_refs)
}

/// SKU backend, else vendor estimator, else the local table. Remote
/// backends always fall back to the local table.
fn build_oracle(cli: &Cli) -> Result<Arc<dyn PriceOracle>> {
    let timeout_ms = match cli.vendor_timeout_ms {
        Some(ms) => ms,
        None => match std::env::var(ENV_VENDOR_TIMEOUT_MS) {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_VENDOR_TIMEOUT_MS} must be milliseconds"))?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        },
    };
    let timeout = Duration::from_millis(timeout_ms);

    let env_or = |flag: &Option<String>, key: &str| {
        flag.clone()
            .or_else(|| std::env::var(key).ok())
            .filter(|s| !s.trim().is_empty())
    };

    if let Some(url) = env_or(&cli.pricing_url, ENV_PRICING_URL) {
        info!(backend = "sku", url = %url, "price oracle");
        let sku = SkuPricingOracle::new_with_base_url(url).with_timeout(timeout);
        return Ok(Arc::new(FallbackOracle::with_local(Box::new(sku))));
    }
    if let Some(url) = env_or(&cli.vendor_url, ENV_VENDOR_URL) {
        info!(backend = "vendor", url = %url, "price oracle");
        let remote = RemoteOracle::with_timeout(url, timeout);
        return Ok(Arc::new(FallbackOracle::with_local(Box::new(remote))));
    }
    Ok(Arc::new(LocalHeuristicOracle))
}

fn set(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn parse_method(raw: &str) -> Result<PaymentMethod> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "card" | "credit card" => Ok(PaymentMethod::CreditCard),
        "po" | "purchase order" => Ok(PaymentMethod::PurchaseOrder),
        other => anyhow::bail!("unknown payment method: {other} (expected card or po)"),
    }
}

fn print_status(o: &Order) {
    println!(
        "order_id={} status={} updated_at={} audit_entries={}",
        o.order_id,
        o.status,
        o.updated_at.to_rfc3339(),
        o.audit.len()
    );
}
