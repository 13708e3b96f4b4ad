use std::process::ExitCode;

use tips_scraper::browser::snapshot::SnapshotBrowser;
use tips_scraper::browser::webdriver::WebDriverBrowser;
use tips_scraper::browser::Browser;
use tips_scraper::{Config, RunOutcome, TipsApi, TipsScraper};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let api_url = match config.resolve_api_url() {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "could not read the API URL");
            return ExitCode::FAILURE;
        }
    };
    info!(api = %api_url, listing = %config.listing_url, "starting tips scraper");
    let api = TipsApi::new(&api_url);

    if let Some(path) = &config.offline_listing {
        info!(path = %path.display(), "scanning a saved listing page");
        return match SnapshotBrowser::new().with_page_file(&config.listing_url, path) {
            Ok(browser) => run(browser, api, &config).await,
            Err(e) => {
                error!(error = %e, "failed to load the saved listing page");
                ExitCode::FAILURE
            }
        };
    }

    match WebDriverBrowser::connect(&config.driver).await {
        Ok(browser) => run(browser, api, &config).await,
        Err(e) => {
            error!(error = %e, webdriver = %config.driver.webdriver_url, "failed to start the browser");
            ExitCode::FAILURE
        }
    }
}

async fn run<B: Browser>(browser: B, api: TipsApi, config: &Config) -> ExitCode {
    let mut scraper = TipsScraper::new(browser, api, config);
    match scraper.run().await {
        RunOutcome::NoCandidates => println!("Nenhuma partida encontrada para enviar."),
        RunOutcome::Submitted(report) => println!(
            "Dicas enviadas com sucesso: {}/{}",
            report.succeeded,
            report.total()
        ),
    }

    if let Err(e) = scraper.shutdown().await {
        error!(error = %e, "failed to close the browser");
        return ExitCode::FAILURE;
    }
    info!("browser closed");
    ExitCode::SUCCESS
}
