use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    marketing::{self, MARKETING_PACKAGES},
    whatsapp::whatsapp_link,
    CartStore, PricingField, StorefrontSession, SubmitOutcome,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "SynthAI storefront client")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the marketing packages and the bundle deal.
    Catalog,
    /// Fetch the affordable project examples from the API.
    Examples,
    /// Sign in and request an AI price quote.
    Quote(QuoteArgs),
    /// Build a cart from marketing packages and print it.
    Cart {
        /// Package id, e.g. `tiktok`. Repeatable.
        #[arg(long = "package")]
        packages: Vec<String>,
        #[arg(long)]
        bundle: bool,
    },
    /// Print the WhatsApp chat link.
    Whatsapp {
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Args, Debug)]
struct QuoteArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    project_type: String,
    #[arg(long)]
    complexity: String,
    #[arg(long)]
    timeline: String,
    #[arg(long)]
    team_size: String,
    /// Put the returned quote in the cart and print the cart.
    #[arg(long)]
    add_to_cart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    match cli.command {
        Command::Catalog => print_catalog(),
        Command::Whatsapp { message } => {
            let message = message.unwrap_or_else(|| settings.whatsapp_message.clone());
            println!("{}", whatsapp_link(&settings.whatsapp_phone, &message)?);
        }
        Command::Examples => {
            let session = StorefrontSession::new(&settings.api_url, settings.request_timeout())?;
            for example in session.affordable_examples().await? {
                println!(
                    "{} ({}): {} - {}, {}",
                    example.name,
                    example.kind,
                    example.price_range.min,
                    example.price_range.max,
                    example.timeline
                );
            }
        }
        Command::Quote(args) => {
            let session = StorefrontSession::new(&settings.api_url, settings.request_timeout())?;
            run_quote(&session, args).await?;
        }
        Command::Cart { packages, bundle } => {
            let cart = CartStore::new();
            let watcher = spawn_cart_watcher(&cart);
            for id in &packages {
                let Some(package) = marketing::find_package(id) else {
                    bail!("unknown marketing package '{id}'");
                };
                package.add_to_cart(&cart);
            }
            if bundle {
                marketing::add_bundle_to_cart(&cart);
            }
            print_cart(&cart);
            drop(cart);
            let updates = watcher.await.context("cart watcher stopped unexpectedly")?;
            info!(updates, "cart session closed");
        }
    }

    Ok(())
}

async fn run_quote(session: &StorefrontSession, args: QuoteArgs) -> Result<()> {
    let user = session
        .auth
        .login(&args.email, &args.password)
        .await
        .context("sign in failed")?;
    info!(user_id = user.id.0, "signed in as {} {}", user.first_name, user.last_name);

    let mut form = session.pricing_form();
    form.set_field(PricingField::Description, args.description);
    form.set_field(PricingField::ProjectType, args.project_type);
    form.set_field(PricingField::Complexity, args.complexity);
    form.set_field(PricingField::Timeline, args.timeline);
    form.set_field(PricingField::TeamSize, args.team_size);

    match form.submit().await {
        SubmitOutcome::LoginRequired => {
            bail!(form.login_prompt().unwrap_or(client_core::pricing_form::LOGIN_PROMPT))
        }
        SubmitOutcome::Invalid(message) | SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Quoted(analysis) => {
            println!("Quote: {}", analysis.pricing.final_price_zar);
            for (label, amount) in form.breakdown_lines() {
                println!("  {label}: {amount}");
            }
            println!("Tech recommender: {}", analysis.ai_analysis.tech_recommender);
            println!("Security audit: {}", analysis.ai_analysis.security_auditor);
            if let Some(message) = &analysis.pricing.affordable_message {
                println!("{message}");
            }
        }
    }

    if args.add_to_cart {
        form.add_result_to_cart(&session.cart);
        print_cart(&session.cart);
    }
    Ok(())
}

fn print_catalog() {
    for package in MARKETING_PACKAGES.iter() {
        let badge = if package.popular { " [Most Popular]" } else { "" };
        println!(
            "{:<10} {}{badge}: {}/{}",
            package.id, package.name, package.price, package.duration
        );
        println!("           {}", package.description);
    }
    println!(
        "Bundle {}: {} (list {})",
        marketing::BUNDLE_NAME,
        marketing::bundle_price(),
        marketing::bundle_list_price()
    );
}

fn print_cart(cart: &CartStore) {
    let snapshot = cart.snapshot();
    if snapshot.items.is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in &snapshot.items {
        let duration = item
            .metadata
            .get("duration")
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        println!("[{}] {}{duration}: {}", item.category, item.name, item.price);
    }
    for (category, subtotal) in cart.totals_by_category() {
        println!("  {category}: {subtotal}");
    }
    println!("Total: {}", snapshot.total);
}

/// Logs cart updates until the store is dropped and returns how many
/// mutations happened, including ones skipped when the receiver fell behind.
fn spawn_cart_watcher(cart: &CartStore) -> tokio::task::JoinHandle<u64> {
    let mut updates = cart.subscribe();
    tokio::spawn(async move {
        let mut seen = 0u64;
        loop {
            match updates.recv().await {
                Ok(snapshot) => {
                    seen += 1;
                    info!(items = snapshot.items.len(), total = %snapshot.total, "cart updated");
                }
                Err(RecvError::Lagged(skipped)) => {
                    seen += skipped;
                    warn!(skipped, "cart watcher fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Zar;

    #[tokio::test]
    async fn watcher_survives_more_updates_than_channel_holds() {
        let cart = CartStore::new();
        let watcher = spawn_cart_watcher(&cart);
        let tiktok = marketing::find_package("tiktok").expect("package");
        for _ in 0..70 {
            tiktok.add_to_cart(&cart);
        }
        assert_eq!(cart.total(), Zar::from_rands(140_000));

        drop(cart);
        assert_eq!(watcher.await.expect("watcher"), 70);
    }
}
