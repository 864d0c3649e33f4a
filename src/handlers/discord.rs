use std::sync::Arc;

use serenity::all::{Command, CommandOptionType, Interaction as DiscordInteraction};
use serenity::async_trait;
use serenity::builder::{
    CreateCommand,
    CreateCommandOption,
    CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use crate::models::query::EventsRequest;
use crate::service::event_service::EventService;
use crate::service::time_service::{self, Clock};

const DISCORD_MESSAGE_LIMIT: usize = 2000;

pub struct BotHandler {
    service: Arc<EventService>,
    clock: Arc<dyn Clock>,
    city: String,
}

impl BotHandler {
    pub fn new(service: Arc<EventService>, clock: Arc<dyn Clock>, city: String) -> Self {
        BotHandler {
            service,
            clock,
            city,
        }
    }

    /// Everything /events does except the Discord plumbing, so tests can
    /// drive it without a gateway.
    pub async fn handle_events_internal(
        &self,
        phrase: &str,
        category: Option<String>,
        venue: Option<String>,
        size: Option<i64>,
    ) -> String {
        let time_expression = if phrase.trim().is_empty() {
            None
        } else {
            Some(phrase.to_string())
        };
        let request = EventsRequest {
            time_expression,
            category,
            venue,
            size,
            ..EventsRequest::default()
        };
        let result = self.service.get_events(&request, self.clock.now()).await;
        let body = if result.is_success() {
            result
                .report
                .unwrap_or_else(|| "No events found matching your criteria.".to_string())
        } else {
            format!(
                "Sorry, I couldn't fetch events right now: {}",
                result
                    .error_message
                    .unwrap_or_else(|| "unknown error".to_string())
            )
        };
        truncate_for_discord(body)
    }

    pub fn handle_time_internal(&self) -> String {
        time_service::time_report(self.clock.now(), &self.city)
    }

    async fn handle_events(&self, ctx: &Context, command: serenity::all::CommandInteraction) {
        let option_text = |name: &str| -> Option<String> {
            command
                .data
                .options
                .iter()
                .find(|opt| opt.name == name)
                .and_then(|opt| match &opt.value {
                    serenity::all::CommandDataOptionValue::String(s) => Some(s.clone()),
                    _ => None,
                })
        };
        let size = command
            .data
            .options
            .iter()
            .find(|opt| opt.name == "size")
            .and_then(|opt| match &opt.value {
                serenity::all::CommandDataOptionValue::Integer(n) => Some(*n),
                _ => None,
            });

        let phrase = option_text("when").unwrap_or_default();
        let body = self
            .handle_events_internal(&phrase, option_text("category"), option_text("venue"), size)
            .await;

        let _ = command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content(body),
                ),
            )
            .await;
    }
}

fn truncate_for_discord(body: String) -> String {
    if body.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return body;
    }
    let truncated: String = body.chars().take(DISCORD_MESSAGE_LIMIT - 1).collect();
    format!("{}…", truncated)
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        println!("{} is connected!", ready.user.name);

        let events_command = CreateCommand::new("events")
            .description("Find local events")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "when",
                    "When? e.g. \"this weekend\", \"next friday\"",
                )
                .required(false),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "category",
                    "Event category (music, sports, arts, ...)",
                )
                .required(false),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "venue", "Venue name filter")
                    .required(false),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "size",
                    "How many events to list (1-100)",
                )
                .required(false),
            );
        let _ = Command::create_global_command(&ctx.http, events_command).await;

        let time_command =
            CreateCommand::new("time").description("Current local time in the events city");
        let _ = Command::create_global_command(&ctx.http, time_command).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: DiscordInteraction) {
        match interaction {
            DiscordInteraction::Command(command) => match command.data.name.as_str() {
                "events" => self.handle_events(&ctx, command).await,
                "time" => {
                    let body = self.handle_time_internal();
                    let _ = command
                        .create_response(
                            &ctx.http,
                            CreateInteractionResponse::Message(
                                CreateInteractionResponseMessage::new().content(body),
                            ),
                        )
                        .await;
                }
                _ => {
                    // Unknown or unhandled command; ignore for now.
                }
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_untouched() {
        let body = "🎯 Show\n".to_string();
        assert_eq!(truncate_for_discord(body.clone()), body);
    }

    #[test]
    fn long_bodies_are_cut_to_the_message_limit() {
        let body = "x".repeat(DISCORD_MESSAGE_LIMIT * 2);
        let truncated = truncate_for_discord(body);
        assert_eq!(truncated.chars().count(), DISCORD_MESSAGE_LIMIT);
        assert!(truncated.ends_with('…'));
    }
}
