use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use central::commands::{describe_error, execute_license_command, parse_license_command, usage};
use central::config::CentralConfig;
use central::database::Database;
use central::errors::CentralResult;
use central::keygen::KeyGenerator;
use central::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(&args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", describe_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> CentralResult<String> {
    let cmd = parse_license_command(args).inspect_err(|_| eprintln!("{}\n", usage()))?;

    let config = CentralConfig::load()?;
    init_tracing(&config.logging.level);

    let db = Arc::new(Database::connect(&config.database.url).await?);
    execute_license_command(&KeyGenerator::new(db), cmd).await
}
