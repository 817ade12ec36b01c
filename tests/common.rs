//! Test utilities & fixtures.
//! Every store lives in its own temp dir so tests never share state.

use guildcraft::bot::{ChatEvent, Invoker, ItemCommandProcessor, Reaction, Reply};
use guildcraft::config::Config;
use guildcraft::economy::{ChannelId, EconomyStore, EconomyStoreBuilder, GuildId, UserId};
use tempfile::TempDir;

#[allow(dead_code)]
pub const GUILD: GuildId = GuildId(4242);

/// Open a throwaway economy store. Keep the `TempDir` alive for the test.
#[allow(dead_code)]
pub fn temp_store() -> (TempDir, EconomyStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = EconomyStoreBuilder::new(dir.path().join("economy"))
        .without_flush()
        .open()
        .expect("store");
    (dir, store)
}

/// Processor with default config and a fixed RNG seed.
#[allow(dead_code)]
pub fn processor() -> (TempDir, ItemCommandProcessor) {
    let (dir, store) = temp_store();
    let processor = ItemCommandProcessor::new(store, &Config::default()).with_rng_seed(7);
    (dir, processor)
}

#[allow(dead_code)]
pub fn member(user: u64) -> Invoker {
    Invoker::new(GUILD, ChannelId(1), UserId(user), &format!("member{}", user))
}

#[allow(dead_code)]
pub fn manager(user: u64) -> Invoker {
    member(user).as_manager()
}

/// Send a message and return the single reply text.
#[allow(dead_code)]
pub fn say(processor: &mut ItemCommandProcessor, who: &Invoker, content: &str) -> String {
    only(processor.handle_event(who, &ChatEvent::message(content)))
}

#[allow(dead_code)]
pub fn react(processor: &mut ItemCommandProcessor, who: &Invoker, reaction: Reaction) -> String {
    only(processor.handle_event(who, &ChatEvent::Reaction(reaction)))
}

fn only(replies: Vec<Reply>) -> String {
    assert_eq!(replies.len(), 1, "expected one reply, got {:?}", replies);
    replies.into_iter().next().map(|r| r.content).unwrap_or_default()
}
