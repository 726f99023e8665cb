use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tokencheck_adapter::CandidateRegistry;
use tokencheck_config::{HarnessConfig, Network};
use tokencheck_harness::Harness;
use tokencheck_signer::{DOMAIN_TYPEHASH, Eip712Domain, PERMIT_TYPEHASH, PermitSigner};

#[derive(Parser, Debug)]
#[command(name = "tokencheck")]
#[command(about = "Differential conformance checker for ERC-20 + permit token implementations")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML or JSON configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the chain id.
    #[arg(long, global = true)]
    pub chain_id: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run the canonical scenario across the candidates and print the report.
    Run(RunArgs),
    /// Print the canonical contract addresses of a network.
    Addresses(AddressesArgs),
    /// Print the EIP-712 domain of the configured deployment.
    Domain(DomainArgs),
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunArgs {
    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Candidates to run, comma separated. Defaults to every registered candidate.
    #[arg(long, value_delimiter = ',')]
    pub candidates: Vec<String>,

    /// Divergence allow-list replacing the built-in one.
    #[arg(long, value_name = "FILE")]
    pub allowlist: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct AddressesArgs {
    /// mainnet, hardhat, polygon, optimism or goerli.
    pub network: String,

    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub(crate) struct DomainArgs {
    /// Also print the raw 160-byte domain encoding.
    #[arg(long)]
    pub raw: bool,
}

impl Cli {
    pub(crate) fn load_config(&self) -> eyre::Result<HarnessConfig> {
        let mut config = HarnessConfig::load(self.config.as_deref())?;
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        Ok(config)
    }

    pub(crate) fn run(self) -> eyre::Result<ExitCode> {
        match &self.command {
            Commands::Run(args) => self.run_scenario(args),
            Commands::Addresses(args) => Self::print_addresses(args),
            Commands::Domain(args) => self.print_domain(args),
        }
    }

    fn run_scenario(&self, args: &RunArgs) -> eyre::Result<ExitCode> {
        let mut config = self.load_config()?;
        if !args.candidates.is_empty() {
            config.candidates.clone_from(&args.candidates);
        }
        if let Some(ref path) = args.allowlist {
            config.allowlist = Some(path.clone());
        }

        let report = Harness::new(config, CandidateRegistry::with_defaults()).run()?;
        if args.json {
            println!("{}", report.to_json()?);
        } else {
            println!("{report}");
        }

        if report.is_conformant() {
            Ok(ExitCode::SUCCESS)
        } else {
            tracing::error!(failures = report.failure_count(), "candidates are not conformant");
            Ok(ExitCode::FAILURE)
        }
    }

    fn print_addresses(args: &AddressesArgs) -> eyre::Result<ExitCode> {
        let network: Network = args.network.parse()?;
        let addresses = network.addresses();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&addresses)?);
        } else {
            match addresses.weth {
                Some(weth) => println!("{network} weth {weth}"),
                None => println!("{network} weth -"),
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn print_domain(&self, args: &DomainArgs) -> eyre::Result<ExitCode> {
        let config = self.load_config()?;
        let owner = PermitSigner::from_bytes(&config.deployer_key)?.address();
        let deployment = config.deployment(owner);
        let domain = Eip712Domain::new(deployment.name.clone(), deployment.chain_id, deployment.address);

        println!("name               {}", deployment.name);
        println!("chain id           {}", deployment.chain_id);
        println!("verifying contract {}", deployment.address);
        println!("domain typehash    {DOMAIN_TYPEHASH}");
        println!("permit typehash    {PERMIT_TYPEHASH}");
        println!("domain separator   {}", domain.separator());
        if args.raw {
            println!("domain encoding    0x{}", hex::encode(domain.encode()));
        }
        Ok(ExitCode::SUCCESS)
    }
}
