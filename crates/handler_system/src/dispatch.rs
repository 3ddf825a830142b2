//! Per-kind fan-out.
//!
//! Every `dispatch_*` method takes a snapshot of its kind's members under the
//! registry guard, releases the guard, then calls each member in registration
//! order. Mutations a subscriber makes to the context or to `&mut` arguments
//! are seen by the subscribers after it in the same call.

use crate::capability::{EventKind, Subscriber};
use crate::context::EventContext;
use crate::error::{EventError, HandlerResult};
use crate::lifecycle::HandlerRegistry;
use crate::types::{
    Block, BlockPos, CommandRef, DamageSource, Diagnostics, EntityRef, Face, HealingSource,
    ItemStack, Skin, Vec3, WorldRef,
};
use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{error, trace, warn};

impl HandlerRegistry {
    /// Calls `invoke` on each member of `kind`, in registration order.
    ///
    /// `invoke` returns `None` when the subscriber does not expose the
    /// capability, which is skipped with a warning. A cancelled context does
    /// not stop the loop; an error or panic does, and is returned.
    fn fan_out<F>(&self, kind: EventKind, mut invoke: F) -> Result<(), EventError>
    where
        F: FnMut(&dyn Subscriber) -> Option<HandlerResult>,
    {
        self.inner.stats.record_dispatch();
        let members = self.inner.table.lock().snapshot(kind);
        if members.is_empty() {
            trace!("No subscribers for {}", kind);
            return Ok(());
        }

        trace!("Dispatching {} to {} subscriber(s)", kind, members.len());
        for member in members.iter() {
            let subscriber = member.subscriber.as_ref();
            match panic::catch_unwind(AssertUnwindSafe(|| invoke(subscriber))) {
                Ok(Some(Ok(()))) => {}
                Ok(Some(Err(source))) => {
                    self.inner.stats.record_failure();
                    error!(
                        "❌ Handler {} failed during {}: {}",
                        subscriber.subscriber_name(),
                        kind,
                        source
                    );
                    return Err(EventError::HandlerFailure {
                        kind,
                        subscriber: subscriber.subscriber_name().to_string(),
                        source,
                    });
                }
                Ok(None) => {
                    warn!(
                        "⚠️ Subscriber {} no longer exposes {}",
                        subscriber.subscriber_name(),
                        kind.handler_trait()
                    );
                }
                Err(payload) => {
                    self.inner.stats.record_panic();
                    let message = panic_message(payload.as_ref());
                    error!(
                        "❌ Handler {} panicked during {}: {}",
                        subscriber.subscriber_name(),
                        kind,
                        message
                    );
                    return Err(EventError::HandlerPanicked {
                        kind,
                        subscriber: subscriber.subscriber_name().to_string(),
                        message,
                    });
                }
            }
        }
        Ok(())
    }

    /// Dispatches a player movement. Cancelling the context cancels the move.
    pub fn dispatch_move(
        &self,
        ctx: &mut EventContext,
        new_pos: Vec3,
        new_yaw: f64,
        new_pitch: f64,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Move, |s| {
            s.as_move_handler().map(|h| h.handle_move(ctx, new_pos, new_yaw, new_pitch))
        })
    }

    /// Dispatches a jump.
    pub fn dispatch_jump(&self) -> Result<(), EventError> {
        self.fan_out(EventKind::Jump, |s| {
            s.as_jump_handler().map(|h| h.handle_jump())
        })
    }

    pub fn dispatch_teleport(&self, ctx: &mut EventContext, pos: Vec3) -> Result<(), EventError> {
        self.fan_out(EventKind::Teleport, |s| {
            s.as_teleport_handler().map(|h| h.handle_teleport(ctx, pos))
        })
    }

    /// Dispatches a world change. `before` is `None` when the player first spawns.
    pub fn dispatch_change_world(
        &self,
        before: Option<&WorldRef>,
        after: &WorldRef,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ChangeWorld, |s| {
            s.as_change_world_handler().map(|h| h.handle_change_world(before, after))
        })
    }

    pub fn dispatch_toggle_sprint(
        &self,
        ctx: &mut EventContext,
        after: bool,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ToggleSprint, |s| {
            s.as_toggle_sprint_handler().map(|h| h.handle_toggle_sprint(ctx, after))
        })
    }

    pub fn dispatch_toggle_sneak(
        &self,
        ctx: &mut EventContext,
        after: bool,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ToggleSneak, |s| {
            s.as_toggle_sneak_handler().map(|h| h.handle_toggle_sneak(ctx, after))
        })
    }

    /// Dispatches a chat message. Subscribers may rewrite `message`; the caller
    /// sends whatever is left unless the context was cancelled.
    pub fn dispatch_chat(
        &self,
        ctx: &mut EventContext,
        message: &mut String,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Chat, |s| {
            s.as_chat_handler().map(|h| h.handle_chat(ctx, message))
        })
    }

    pub fn dispatch_food_loss(
        &self,
        ctx: &mut EventContext,
        from: i32,
        to: &mut i32,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::FoodLoss, |s| {
            s.as_food_loss_handler().map(|h| h.handle_food_loss(ctx, from, to))
        })
    }

    pub fn dispatch_heal(
        &self,
        ctx: &mut EventContext,
        health: &mut f64,
        src: &HealingSource,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Heal, |s| {
            s.as_heal_handler().map(|h| h.handle_heal(ctx, health, src))
        })
    }

    /// Dispatches damage taken. Both `damage` and `attack_immunity` are folded through subscribers.
    pub fn dispatch_hurt(
        &self,
        ctx: &mut EventContext,
        damage: &mut f64,
        attack_immunity: &mut Duration,
        src: &DamageSource,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Hurt, |s| {
            s.as_hurt_handler().map(|h| h.handle_hurt(ctx, damage, attack_immunity, src))
        })
    }

    pub fn dispatch_death(
        &self,
        src: &DamageSource,
        keep_inventory: &mut bool,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Death, |s| {
            s.as_death_handler().map(|h| h.handle_death(src, keep_inventory))
        })
    }

    pub fn dispatch_respawn(&self, pos: &mut Vec3, world: &mut WorldRef) -> Result<(), EventError> {
        self.fan_out(EventKind::Respawn, |s| {
            s.as_respawn_handler().map(|h| h.handle_respawn(pos, world))
        })
    }

    pub fn dispatch_skin_change(
        &self,
        ctx: &mut EventContext,
        skin: &mut Skin,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::SkinChange, |s| {
            s.as_skin_change_handler().map(|h| h.handle_skin_change(ctx, skin))
        })
    }

    pub fn dispatch_fire_extinguish(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::FireExtinguish, |s| {
            s.as_fire_extinguish_handler().map(|h| h.handle_fire_extinguish(ctx, pos))
        })
    }

    pub fn dispatch_start_break(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::StartBreak, |s| {
            s.as_start_break_handler().map(|h| h.handle_start_break(ctx, pos))
        })
    }

    /// Dispatches a broken block. Subscribers may change the drops and the experience released.
    pub fn dispatch_block_break(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        drops: &mut Vec<ItemStack>,
        experience: &mut i32,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::BlockBreak, |s| {
            s.as_block_break_handler().map(|h| h.handle_block_break(ctx, pos, drops, experience))
        })
    }

    pub fn dispatch_block_place(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        block: &Block,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::BlockPlace, |s| {
            s.as_block_place_handler().map(|h| h.handle_block_place(ctx, pos, block))
        })
    }

    pub fn dispatch_block_pick(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        block: &Block,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::BlockPick, |s| {
            s.as_block_pick_handler().map(|h| h.handle_block_pick(ctx, pos, block))
        })
    }

    pub fn dispatch_item_use(&self, ctx: &mut EventContext) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemUse, |s| {
            s.as_item_use_handler().map(|h| h.handle_item_use(ctx))
        })
    }

    pub fn dispatch_item_use_on_block(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        face: Face,
        click_pos: Vec3,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemUseOnBlock, |s| {
            s.as_item_use_on_block_handler()
                .map(|h| h.handle_item_use_on_block(ctx, pos, face, click_pos))
        })
    }

    pub fn dispatch_item_use_on_entity(
        &self,
        ctx: &mut EventContext,
        entity: &EntityRef,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemUseOnEntity, |s| {
            s.as_item_use_on_entity_handler().map(|h| h.handle_item_use_on_entity(ctx, entity))
        })
    }

    pub fn dispatch_item_release(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
        duration: Duration,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemRelease, |s| {
            s.as_item_release_handler().map(|h| h.handle_item_release(ctx, item, duration))
        })
    }

    pub fn dispatch_item_consume(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemConsume, |s| {
            s.as_item_consume_handler().map(|h| h.handle_item_consume(ctx, item))
        })
    }

    /// Dispatches an attack on an entity. Knock-back and the critical flag are
    /// folded through subscribers.
    pub fn dispatch_attack_entity(
        &self,
        ctx: &mut EventContext,
        entity: &EntityRef,
        force: &mut f64,
        height: &mut f64,
        critical: &mut bool,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::AttackEntity, |s| {
            s.as_attack_entity_handler()
                .map(|h| h.handle_attack_entity(ctx, entity, force, height, critical))
        })
    }

    pub fn dispatch_experience_gain(
        &self,
        ctx: &mut EventContext,
        amount: &mut i32,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ExperienceGain, |s| {
            s.as_experience_gain_handler().map(|h| h.handle_experience_gain(ctx, amount))
        })
    }

    pub fn dispatch_punch_air(&self, ctx: &mut EventContext) -> Result<(), EventError> {
        self.fan_out(EventKind::PunchAir, |s| {
            s.as_punch_air_handler().map(|h| h.handle_punch_air(ctx))
        })
    }

    pub fn dispatch_sign_edit(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        front_side: bool,
        old_text: &str,
        new_text: &str,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::SignEdit, |s| {
            s.as_sign_edit_handler()
                .map(|h| h.handle_sign_edit(ctx, pos, front_side, old_text, new_text))
        })
    }

    pub fn dispatch_lectern_page_turn(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        old_page: i32,
        new_page: &mut i32,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::LecternPageTurn, |s| {
            s.as_lectern_page_turn_handler()
                .map(|h| h.handle_lectern_page_turn(ctx, pos, old_page, new_page))
        })
    }

    pub fn dispatch_item_damage(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
        damage: i32,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemDamage, |s| {
            s.as_item_damage_handler().map(|h| h.handle_item_damage(ctx, item, damage))
        })
    }

    pub fn dispatch_item_pickup(
        &self,
        ctx: &mut EventContext,
        item: &mut ItemStack,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemPickup, |s| {
            s.as_item_pickup_handler().map(|h| h.handle_item_pickup(ctx, item))
        })
    }

    pub fn dispatch_held_slot_change(
        &self,
        ctx: &mut EventContext,
        from: usize,
        to: usize,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::HeldSlotChange, |s| {
            s.as_held_slot_change_handler().map(|h| h.handle_held_slot_change(ctx, from, to))
        })
    }

    pub fn dispatch_item_drop(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::ItemDrop, |s| {
            s.as_item_drop_handler().map(|h| h.handle_item_drop(ctx, item))
        })
    }

    /// Dispatches a transfer to another server. Subscribers may redirect `addr`.
    pub fn dispatch_transfer(
        &self,
        ctx: &mut EventContext,
        addr: &mut SocketAddr,
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::Transfer, |s| {
            s.as_transfer_handler().map(|h| h.handle_transfer(ctx, addr))
        })
    }

    /// Dispatches a command invocation. The caller skips the command when the
    /// context comes back cancelled.
    pub fn dispatch_command_execution(
        &self,
        ctx: &mut EventContext,
        command: &CommandRef,
        args: &[String],
    ) -> Result<(), EventError> {
        self.fan_out(EventKind::CommandExecution, |s| {
            s.as_command_execution_handler().map(|h| h.handle_command_execution(ctx, command, args))
        })
    }

    /// Dispatches a player leaving.
    pub fn dispatch_quit(&self) -> Result<(), EventError> {
        self.fan_out(EventKind::Quit, |s| {
            s.as_quit_handler().map(|h| h.handle_quit())
        })
    }

    pub fn dispatch_diagnostics(&self, diagnostics: &Diagnostics) -> Result<(), EventError> {
        self.fan_out(EventKind::Diagnostics, |s| {
            s.as_diagnostics_handler().map(|h| h.handle_diagnostics(diagnostics))
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{BlockBreakHandler, ChatHandler, QuitHandler};
    use crate::error::HandlerError;
    use crate::subscriber;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Appends a suffix to chat messages and records each call.
    struct Suffix {
        suffix: &'static str,
        journal: Journal,
        cancel: bool,
    }

    impl ChatHandler for Suffix {
        fn handle_chat(&self, ctx: &mut EventContext, message: &mut String) -> HandlerResult {
            self.journal.lock().push(format!("{}:{}", self.suffix, message));
            message.push_str(self.suffix);
            if self.cancel {
                ctx.cancel();
            }
            Ok(())
        }
    }

    subscriber!(Suffix: Chat);

    struct Failing;

    impl ChatHandler for Failing {
        fn handle_chat(&self, _ctx: &mut EventContext, _message: &mut String) -> HandlerResult {
            Err(HandlerError::new("chat filter offline"))
        }
    }

    impl QuitHandler for Failing {
        fn handle_quit(&self) -> HandlerResult {
            Ok(())
        }
    }

    subscriber!(Failing: Chat, Quit);

    struct Panicking;

    impl QuitHandler for Panicking {
        fn handle_quit(&self) -> HandlerResult {
            panic!("quit handler exploded");
        }
    }

    subscriber!(Panicking: Quit);

    struct DoubleDrops;

    impl BlockBreakHandler for DoubleDrops {
        fn handle_block_break(
            &self,
            _ctx: &mut EventContext,
            _pos: BlockPos,
            drops: &mut Vec<ItemStack>,
            experience: &mut i32,
        ) -> HandlerResult {
            for drop in drops.iter_mut() {
                drop.count *= 2;
            }
            *experience += 1;
            Ok(())
        }
    }

    subscriber!(DoubleDrops: BlockBreak);

    fn suffix(suffix: &'static str, journal: &Journal, cancel: bool) -> Arc<Suffix> {
        Arc::new(Suffix {
            suffix,
            journal: journal.clone(),
            cancel,
        })
    }

    #[test]
    fn test_mutations_fold_through_subscribers_in_order() {
        let registry = HandlerRegistry::new();
        let journal = Journal::default();
        registry.register(suffix("!", &journal, false)).unwrap();
        registry.register(suffix("?", &journal, false)).unwrap();

        let mut ctx = EventContext::new();
        let mut message = String::from("hi");
        registry.dispatch_chat(&mut ctx, &mut message).unwrap();

        assert_eq!(message, "hi!?");
        assert_eq!(*journal.lock(), vec!["!:hi".to_string(), "?:hi!".to_string()]);
    }

    #[test]
    fn test_cancellation_does_not_short_circuit() {
        let registry = HandlerRegistry::new();
        let journal = Journal::default();
        registry.register(suffix("a", &journal, true)).unwrap();
        registry.register(suffix("b", &journal, false)).unwrap();

        let mut ctx = EventContext::new();
        let mut message = String::new();
        registry.dispatch_chat(&mut ctx, &mut message).unwrap();

        assert!(ctx.is_cancelled());
        assert_eq!(journal.lock().len(), 2);
    }

    #[test]
    fn test_handler_error_aborts_rest_of_call() {
        let registry = HandlerRegistry::new();
        let journal = Journal::default();
        registry.register(Arc::new(Failing)).unwrap();
        registry.register(suffix("x", &journal, false)).unwrap();

        let mut ctx = EventContext::new();
        let mut message = String::from("m");
        let err = registry.dispatch_chat(&mut ctx, &mut message).unwrap_err();

        assert!(matches!(err, EventError::HandlerFailure { kind: EventKind::Chat, .. }));
        assert!(err.to_string().contains("chat filter offline"));
        assert!(journal.lock().is_empty());
        assert_eq!(registry.stats().handler_failures, 1);

        // Other kinds are unaffected.
        registry.dispatch_quit().unwrap();
    }

    #[test]
    fn test_panicking_handler_is_reported() {
        let registry = HandlerRegistry::new();
        registry.register(Arc::new(Panicking)).unwrap();

        let err = registry.dispatch_quit().unwrap_err();
        match err {
            EventError::HandlerPanicked { kind, message, .. } => {
                assert_eq!(kind, EventKind::Quit);
                assert_eq!(message, "quit handler exploded");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.stats().handler_panics, 1);

        // The registry stays usable after a panic.
        assert_eq!(registry.subscriber_count(EventKind::Quit), 1);
    }

    #[test]
    fn test_out_parameters_are_visible_to_caller() {
        let registry = HandlerRegistry::new();
        registry.register(Arc::new(DoubleDrops)).unwrap();
        registry.register(Arc::new(DoubleDrops)).unwrap();

        let mut ctx = EventContext::new();
        let mut drops = vec![ItemStack::new("minecraft:cobblestone", 1)];
        let mut experience = 0;
        registry
            .dispatch_block_break(&mut ctx, BlockPos::new(0, 64, 0), &mut drops, &mut experience)
            .unwrap();

        assert_eq!(drops[0].count, 4);
        assert_eq!(experience, 2);
    }

    #[test]
    fn test_empty_dispatch_is_a_noop() {
        let registry = HandlerRegistry::new();
        let mut ctx = EventContext::new();
        registry.dispatch_punch_air(&mut ctx).unwrap();
        registry.dispatch_diagnostics(&Diagnostics::default()).unwrap();

        assert!(!ctx.is_cancelled());
        assert_eq!(registry.stats().dispatches, 2);
    }
}
