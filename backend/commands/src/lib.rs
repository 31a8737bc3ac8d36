pub mod detection;
pub mod dispatch;
pub mod format;
pub mod handlers;
pub mod registry;
pub mod types;

use std::sync::Arc;

use hushwatch_engine::{GroupSettingsStore, RecordEngine};

pub use detection::{detect_command, is_command_like};
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, CommandResponse};
pub use format::format_duration;
pub use handlers::{
    parse_seed_seconds, CleanHandler, DisplayOptions, HelpHandler, HistoryHandler,
    LeaderboardHandler, RecordHandler, SeedHandler, StartHandler, ToggleAnnouncementsHandler,
};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{CommandArg, CommandDef, CommandInvocation};

/// Build a dispatcher pre-wired with all built-in handlers.
pub fn build_dispatcher(
    engine: Arc<RecordEngine>,
    settings: Arc<GroupSettingsStore>,
    options: DisplayOptions,
) -> CommandDispatcher {
    let registry = CommandRegistry::new();
    let mut dispatcher = CommandDispatcher::new(registry.clone());

    dispatcher.register("start", Arc::new(StartHandler));
    dispatcher.register("help", Arc::new(HelpHandler { registry }));
    dispatcher.register("record", Arc::new(RecordHandler { engine: Arc::clone(&engine) }));
    dispatcher.register(
        "leaderboard",
        Arc::new(LeaderboardHandler { engine: Arc::clone(&engine), limit: options.leaderboard_size }),
    );
    dispatcher.register(
        "history",
        Arc::new(HistoryHandler { engine: Arc::clone(&engine), limit: options.history_size }),
    );
    dispatcher.register("toggle_announcements", Arc::new(ToggleAnnouncementsHandler { settings }));
    dispatcher.register(
        "seed",
        Arc::new(SeedHandler { engine: Arc::clone(&engine), default_seconds: options.seed_seconds }),
    );
    dispatcher.register("clean", Arc::new(CleanHandler { engine }));

    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushwatch_core::UserRef;
    use hushwatch_storage::InMemoryGateway;

    struct Fixture {
        engine: Arc<RecordEngine>,
        settings: Arc<GroupSettingsStore>,
        dispatcher: CommandDispatcher,
    }

    fn fixture() -> Fixture {
        let (engine, settings) = hushwatch_engine::build(Arc::new(InMemoryGateway::new()));
        let dispatcher =
            build_dispatcher(Arc::clone(&engine), Arc::clone(&settings), DisplayOptions::default());
        Fixture { engine, settings, dispatcher }
    }

    fn ctx(is_admin: bool) -> CommandContext {
        CommandContext { group_id: -100, sender: UserRef::new(7, "Ann"), is_admin }
    }

    async fn run(f: &Fixture, text: &str, is_admin: bool) -> CommandResponse {
        let inv = detect_command(text, f.dispatcher.registry(), None).unwrap();
        f.dispatcher.dispatch(&ctx(is_admin), &inv).await.unwrap()
    }

    #[tokio::test]
    async fn every_builtin_has_a_handler() {
        let f = fixture();
        for def in builtin_commands() {
            let inv = detect_command(&def.usage().replace(" [seconds]", ""), f.dispatcher.registry(), None)
                .unwrap();
            let reply = f.dispatcher.dispatch(&ctx(true), &inv).await.unwrap();
            assert!(!reply.text.starts_with("❓"), "/{} has no handler", def.key);
        }
    }

    #[tokio::test]
    async fn non_admin_cannot_seed() {
        let f = fixture();
        let reply = run(&f, "/seed 900", false).await;
        assert!(reply.ephemeral);
        assert!(reply.text.contains("Only group admins"));
        assert_eq!(f.engine.current_record(-100).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn admin_seed_uses_default_or_argument() {
        let f = fixture();
        let reply = run(&f, "/seed", true).await;
        assert!(reply.text.contains("10 minutes"));
        assert_eq!(f.engine.current_record(-100).await.unwrap(), 600.0);

        run(&f, "/seed 3600", true).await;
        assert_eq!(f.engine.current_record(-100).await.unwrap(), 3600.0);
    }

    #[tokio::test]
    async fn invalid_seed_replies_with_usage() {
        let f = fixture();
        let reply = run(&f, "/seed -5", true).await;
        assert!(reply.ephemeral);
        assert!(reply.text.contains("Usage: /seed [seconds]"));
        assert_eq!(f.engine.current_record(-100).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn toggle_is_admin_only() {
        let f = fixture();
        run(&f, "/toggle_announcements", false).await;
        assert!(f.settings.is_announcement_enabled(-100).await.unwrap());

        let reply = run(&f, "/toggle_announcements", true).await;
        assert!(reply.text.contains("Disabled"));
        assert!(!f.settings.is_announcement_enabled(-100).await.unwrap());
    }

    #[tokio::test]
    async fn record_reports_current_value() {
        let f = fixture();
        f.engine.seed_record(-100, 700.0).await.unwrap();
        let reply = run(&f, "/record", false).await;
        assert!(reply.text.contains("11 minutes, 40 seconds"));
    }

    #[tokio::test]
    async fn clean_wipes_group() {
        let f = fixture();
        f.engine.process_message(-100, 0.0, UserRef::new(1, "A")).await.unwrap();
        f.engine.process_message(-100, 50.0, UserRef::new(2, "B")).await.unwrap();
        assert!(!f.engine.history(-100).await.unwrap().is_empty());

        run(&f, "/clean", true).await;
        assert!(f.engine.history(-100).await.unwrap().is_empty());
        assert_eq!(f.engine.current_record(-100).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn leaderboard_and_history_reflect_records() {
        let f = fixture();
        f.engine.process_message(-100, 0.0, UserRef::new(1, "Ann")).await.unwrap();
        f.engine.process_message(-100, 700.0, UserRef::new(2, "Bob")).await.unwrap();

        let board = run(&f, "/leaderboard", false).await;
        assert!(board.text.contains("1. Ann (1)"));
        assert!(board.text.contains("1. Bob (1)"));

        let history = run(&f, "/history", false).await;
        assert!(history.text.contains("Ann → Bob"));
    }

    #[tokio::test]
    async fn help_marks_admin_commands() {
        let f = fixture();
        let reply = run(&f, "/help", false).await;
        assert!(reply.text.contains("/clean - "));
        assert!(reply.text.contains("(admins only)"));
    }
}
