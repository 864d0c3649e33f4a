use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;

use crate::clients::ticketmaster::TicketmasterClient;
use crate::config::VenueConfig;
use crate::handlers::discord::BotHandler;
use crate::service::event_service::EventService;
use crate::service::time_service::VenueClock;

pub async fn run_api(config: VenueConfig, discord_client_secret: String) {
    let clock = Arc::new(VenueClock::new(config.timezone));
    let city = config.city.clone();
    let service = Arc::new(EventService::new(
        Arc::new(TicketmasterClient::new(config.clone())),
        config,
    ));
    let handler = BotHandler::new(service, clock, city);

    let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES;
    let mut client = serenity::Client::builder(discord_client_secret, intents)
        .event_handler(handler)
        .await
        .expect("Error creating Serenity client");

    if let Err(why) = client.start().await {
        eprintln!("Client error: {:?}", why);
    }
}
