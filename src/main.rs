use buildmyrig::config::Settings;
use buildmyrig::core::advisor::MSG_UNEXPECTED;
use buildmyrig::core::{render, ConfigProvider, Notifier};
use buildmyrig::domain::model::Notification;
use buildmyrig::utils::error::{AdvisorError, ErrorSeverity};
use buildmyrig::utils::logger;
use buildmyrig::{
    BuildAdvisor, CliConfig, Command, ConsoleNotifier, HttpAdvisorClient, PageOutcome,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }
    tracing::debug!("Settings: {:?}", settings);

    let notifier = ConsoleNotifier::new();

    match run(&settings, &cli.command, notifier.clone()).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(
                "Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            // BuildAdvisor 已通知過的錯誤不再重複通知
            if notifier.error_count() == 0 {
                notifier.notify(Notification::error(MSG_UNEXPECTED));
            }
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(
    settings: &Settings,
    command: &Command,
    notifier: ConsoleNotifier,
) -> Result<(), AdvisorError> {
    let client = HttpAdvisorClient::from_config(settings)?;
    let advisor = BuildAdvisor::new(client, notifier)
        .with_page_size(settings.page_size())
        .with_service_label(settings.base_url());

    match command {
        Command::Health => {
            if advisor.check_connection().await {
                println!("✅ API connection successful");
                Ok(())
            } else {
                std::process::exit(2);
            }
        }
        Command::Recommend { json, .. } => {
            let request = match command.build_request() {
                Some(request) => request?,
                None => return Ok(()),
            };
            advisor.submit_build(&request).await?;

            let view = advisor.builds();
            if *json {
                let builds: Vec<_> = view.cards.iter().map(|card| &card.build).collect();
                println!("{}", serde_json::to_string_pretty(&builds)?);
            } else {
                print!("{}", render::render_build_results(&view));
            }
            Ok(())
        }
        Command::Parts {
            category,
            pages,
            brand,
            ..
        } => {
            let category = category.unwrap_or_else(|| settings.default_category());
            let mut outcome = advisor
                .load_parts_for_brand(category, command.parts_sort(), brand.clone())
                .await?;

            // 載入更多失敗時仍輸出已顯示的零件
            let mut failure = None;
            let mut loaded = 1;
            while loaded < *pages && matches!(outcome, PageOutcome::Loaded { more: true, .. }) {
                match advisor.load_more().await {
                    Ok(next) => outcome = next,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
                loaded += 1;
            }

            print!("{}", render::render_parts_view(&advisor.parts()));
            match failure {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
        Command::AllParts => {
            let parts = advisor.all_parts().await?;
            println!("Showing {} parts", parts.len());
            for part in &parts {
                print!("{}", render::render_part_card(part));
            }
            Ok(())
        }
        Command::Stats => {
            let stats = advisor.catalog_stats().await?;
            print!("{}", render::render_catalog_stats(&stats));
            Ok(())
        }
        Command::Info => {
            let info = advisor.api_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
    }
}
