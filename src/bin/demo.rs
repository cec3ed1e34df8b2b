use std::io::{self, Write};

use clap::Parser;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use num_bigint::BigUint;
use schnorr_zkp::{
    GenerationConfig, KeyPair, Parameters, Prover, SearchHandle, SecureRng, Simulator, Verifier,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "schnorr-demo")]
#[command(about = "Runs one round of the Schnorr identification protocol", long_about = None)]
#[command(version)]
struct Args {
    /// Bit length of the subgroup order q (overrides SCHNORR_BITS and the config file)
    #[arg(short, long)]
    bits: Option<u64>,

    /// Use the fixed toy group p = 23, q = 11, g = 2 instead of generating one
    #[arg(long)]
    insecure_demo: bool,

    /// Also print a transcript forged by the simulator
    #[arg(short, long)]
    simulate: bool,

    /// Print the fixed-width wire encodings
    #[arg(short, long)]
    wire: bool,
}

fn print_colored(color: Color, text: &str) {
    let mut stdout = io::stdout();
    execute!(stdout, SetForegroundColor(color), Print(text), ResetColor).ok();
    stdout.flush().ok();
}

fn println_colored(color: Color, text: &str) {
    print_colored(color, text);
    println!();
}

fn display_banner() {
    println!();
    println_colored(
        Color::Cyan,
        "+---------------------------------------------------------+",
    );
    println_colored(
        Color::Cyan,
        "|        Schnorr Zero-Knowledge Identification            |",
    );
    println_colored(
        Color::Cyan,
        "+---------------------------------------------------------+",
    );
    println!();
}

fn section(title: &str) {
    println!();
    println_colored(Color::Yellow, title);
}

fn field(name: &str, value: &BigUint) {
    print_colored(Color::White, &format!("  {name:<12}"));
    println!("{value:x}");
}

async fn search_parameters(
    config: GenerationConfig,
) -> Result<Parameters, Box<dyn std::error::Error>> {
    info!(bits = config.bits, "Searching for group parameters (Ctrl-C to cancel)");

    let handle = SearchHandle::spawn(config);
    let cancel = handle.cancel_token();
    let join = handle.join();
    tokio::pin!(join);

    tokio::select! {
        result = &mut join => Ok(result?),
        _ = signal::ctrl_c() => {
            warn!("Interrupt received, cancelling parameter search");
            cancel.cancel();
            Ok(join.await?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    display_banner();

    let params = if args.insecure_demo {
        println_colored(
            Color::Red,
            "WARNING: the demonstration group offers no security",
        );
        Parameters::demo()
    } else {
        let mut config = GenerationConfig::from_env().unwrap_or_else(|e| {
            error!("Failed to load configuration: {e}");
            info!("Using default configuration");
            GenerationConfig::default()
        });

        if let Some(bits) = args.bits {
            config.bits = bits;
        }

        if let Err(e) = config.validate() {
            println_colored(Color::Red, &format!("Configuration validation failed: {e}"));
            return Err(format!("Invalid configuration: {e}").into());
        }

        match search_parameters(config).await {
            Ok(params) => params,
            Err(e) => {
                println_colored(Color::Red, &format!("Parameter generation failed: {e}"));
                return Err(e);
            }
        }
    };

    let mut rng = SecureRng::try_new()?;

    section("Group parameters");
    field("p", params.p());
    field("q", params.q());
    field("g", params.g());

    let key_pair = KeyPair::generate(&params, &mut rng)?;
    let public_key = key_pair.public_key().clone();

    section("Key pair");
    field("public y", &public_key);
    println!("  {:<12}<kept by the prover>", "private x");

    let mut prover = Prover::new(key_pair);
    let verifier = Verifier::new(params.clone());

    section("Protocol round");
    let commitment = prover.commit(&mut rng)?;
    field("commit r", &commitment);

    let challenge = verifier.challenge(&mut rng)?;
    field("challenge c", &challenge);

    let proof = prover.respond(&challenge)?;
    field("response s", proof.response());

    println!();
    if verifier.check(&proof, &public_key) {
        println_colored(Color::Green, "ACCEPTED: g^s == r * y^c (mod p)");
    } else {
        println_colored(Color::Red, "REJECTED: g^s != r * y^c (mod p)");
    }

    if args.wire {
        section("Wire encodings");
        println!("  {:<12}{}", "parameters", hex::encode(params.to_bytes()?));
        println!(
            "  {:<12}{}",
            "public key",
            hex::encode(params.encode_element(&public_key)?)
        );
        println!("  {:<12}{}", "proof", hex::encode(proof.to_bytes(&params)?));
    }

    if args.simulate {
        section("Simulated transcript (no private key used)");
        let simulator = Simulator::new(params.clone(), public_key.clone())?;
        let simulated = simulator.simulate(&mut rng)?;
        println!("  {simulated}");

        if verifier.check(&simulated, &public_key) {
            println_colored(Color::Green, "  simulated transcript is ACCEPTED as well");
        } else {
            println_colored(Color::Red, "  simulated transcript was REJECTED");
        }
    }

    prover.destroy();
    println!();

    Ok(())
}
