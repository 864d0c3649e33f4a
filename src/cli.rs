use std::sync::Arc;

use clap::{Parser, Subcommand};
use inquire::Text;

use crate::clients::ticketmaster::TicketmasterClient;
use crate::config::VenueConfig;
use crate::models::query::EventsRequest;
use crate::service::event_service::EventService;
use crate::service::time_service::{self, Clock, VenueClock};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up events for a natural time phrase ("this weekend", "next friday").
    Query {
        phrase: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        size: Option<i64>,
    },
    /// Ask for the phrase interactively.
    QueryPrompt {},
    /// Print the current local time for the configured city.
    Time {},
}

pub async fn cli(config: VenueConfig) {
    // Fine to panic here
    let cli = Cli::parse();
    let clock = VenueClock::new(config.timezone);
    let city = config.city.clone();
    let service = EventService::new(
        Arc::new(TicketmasterClient::new(config.clone())),
        config,
    );
    match &cli.command {
        Commands::Query {
            phrase,
            category,
            venue,
            size,
        } => {
            let request = EventsRequest {
                time_expression: Some(phrase.clone()),
                category: category.clone(),
                venue: venue.clone(),
                size: *size,
                ..EventsRequest::default()
            };
            run_query(&service, &request, &clock).await;
        }
        Commands::QueryPrompt {} => match specify_phrase() {
            Ok(phrase) => {
                let request = EventsRequest::for_phrase(phrase);
                run_query(&service, &request, &clock).await;
            }
            Err(_) => println!("No query supplied"),
        },
        Commands::Time {} => {
            println!("{}", time_service::time_report(clock.now(), &city));
        }
    }
}

async fn run_query(service: &EventService, request: &EventsRequest, clock: &VenueClock) {
    let result = service.get_events(request, clock.now()).await;
    if result.is_success() {
        println!("{}", result.report.unwrap_or_default());
    } else {
        println!(
            "Failed to fetch events: {}",
            result
                .error_message
                .unwrap_or_else(|| "unknown error".to_string())
        );
    }
}

fn specify_phrase() -> Result<String, Box<dyn std::error::Error>> {
    Ok(Text::new("What are you looking for? (e.g. \"concerts this weekend\")").prompt()?)
}
