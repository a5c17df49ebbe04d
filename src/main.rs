// src/main.rs

use predictor_scheduler::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();

    let guard = match logging::init_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("predictor-scheduler error: {err:?}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args).await {
        tracing::error!(fatal = true, error = %err, "unable to run scheduler");
        // Flush the file writer; `exit` skips destructors.
        drop(guard);
        std::process::exit(1);
    }
}
