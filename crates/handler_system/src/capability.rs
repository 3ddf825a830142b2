//! Capability taxonomy: the event kinds and the handler trait for each.
//!
//! A subscriber opts into a kind by implementing that kind's handler trait and
//! exposing it through the matching [`Subscriber`] accessor. The
//! [`subscriber!`](crate::subscriber) macro writes the accessors:
//!
//! ```rust
//! use handler_system::{subscriber, ChatHandler, EventContext, HandlerResult, QuitHandler};
//!
//! struct Greeter;
//!
//! impl ChatHandler for Greeter {
//!     fn handle_chat(&self, _ctx: &mut EventContext, message: &mut String) -> HandlerResult {
//!         message.push_str(" o/");
//!         Ok(())
//!     }
//! }
//!
//! impl QuitHandler for Greeter {
//!     fn handle_quit(&self) -> HandlerResult {
//!         Ok(())
//!     }
//! }
//!
//! subscriber!(Greeter: Chat, Quit);
//! ```
//!
//! Which kinds a subscriber supports is decided once, when it is registered.

use crate::context::EventContext;
use crate::error::{EventError, HandlerResult};
use crate::types::{
    Block, BlockPos, CommandRef, DamageSource, Diagnostics, EntityRef, Face, HealingSource,
    ItemStack, Skin, Vec3, WorldRef,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Handler traits
// ============================================================================

pub trait MoveHandler {
    /// Handles the movement of a player. `ctx.cancel()` cancels the movement.
    fn handle_move(
        &self,
        ctx: &mut EventContext,
        new_pos: Vec3,
        new_yaw: f64,
        new_pitch: f64,
    ) -> HandlerResult;
}

pub trait JumpHandler {
    /// Handles the player jumping.
    fn handle_jump(&self) -> HandlerResult;
}

pub trait TeleportHandler {
    /// Handles the teleportation of a player. `ctx.cancel()` cancels it.
    fn handle_teleport(&self, ctx: &mut EventContext, pos: Vec3) -> HandlerResult;
}

pub trait ChangeWorldHandler {
    /// Handles the player being added to a new world. `before` is `None` on first spawn.
    fn handle_change_world(&self, before: Option<&WorldRef>, after: &WorldRef) -> HandlerResult;
}

pub trait ToggleSprintHandler {
    /// Handles the player starting or stopping sprinting. `after` is the new state.
    fn handle_toggle_sprint(&self, ctx: &mut EventContext, after: bool) -> HandlerResult;
}

pub trait ToggleSneakHandler {
    /// Handles the player starting or stopping sneaking. `after` is the new state.
    fn handle_toggle_sneak(&self, ctx: &mut EventContext, after: bool) -> HandlerResult;
}

pub trait ChatHandler {
    /// Handles a chat message sent by the player.
    ///
    /// `ctx.cancel()` stops the message from being sent. The message may be
    /// rewritten by assigning to `*message`.
    fn handle_chat(&self, ctx: &mut EventContext, message: &mut String) -> HandlerResult;
}

pub trait FoodLossHandler {
    /// Handles the food bar depleting naturally. `to` may be changed.
    fn handle_food_loss(&self, ctx: &mut EventContext, from: i32, to: &mut i32) -> HandlerResult;
}

pub trait HealHandler {
    /// Handles the player being healed. The health added may be changed.
    fn handle_heal(
        &self,
        ctx: &mut EventContext,
        health: &mut f64,
        src: &HealingSource,
    ) -> HandlerResult;
}

pub trait HurtHandler {
    /// Handles the player being hurt by any damage source.
    ///
    /// Both the damage dealt and the attack immunity granted afterwards may be
    /// changed.
    fn handle_hurt(
        &self,
        ctx: &mut EventContext,
        damage: &mut f64,
        attack_immunity: &mut Duration,
        src: &DamageSource,
    ) -> HandlerResult;
}

pub trait DeathHandler {
    /// Handles the player dying. Setting `*keep_inventory` keeps the player's items.
    fn handle_death(&self, src: &DamageSource, keep_inventory: &mut bool) -> HandlerResult;
}

pub trait RespawnHandler {
    /// Handles the player respawning. Both the spawn position and the world may be changed.
    fn handle_respawn(&self, pos: &mut Vec3, world: &mut WorldRef) -> HandlerResult;
}

pub trait SkinChangeHandler {
    /// Handles the player changing their skin.
    fn handle_skin_change(&self, ctx: &mut EventContext, skin: &mut Skin) -> HandlerResult;
}

pub trait FireExtinguishHandler {
    /// Handles the player extinguishing a fire at `pos`.
    fn handle_fire_extinguish(&self, ctx: &mut EventContext, pos: BlockPos) -> HandlerResult;
}

pub trait StartBreakHandler {
    /// Handles the player starting to break the block at `pos`.
    fn handle_start_break(&self, ctx: &mut EventContext, pos: BlockPos) -> HandlerResult;
}

pub trait BlockBreakHandler {
    /// Handles a block being broken by the player.
    ///
    /// The drops and the experience released may be changed.
    fn handle_block_break(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        drops: &mut Vec<ItemStack>,
        experience: &mut i32,
    ) -> HandlerResult;
}

pub trait BlockPlaceHandler {
    /// Handles the player placing `block` at `pos`.
    fn handle_block_place(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        block: &Block,
    ) -> HandlerResult;
}

pub trait BlockPickHandler {
    /// Handles the player picking `block` at `pos`.
    fn handle_block_pick(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        block: &Block,
    ) -> HandlerResult;
}

pub trait ItemUseHandler {
    /// Handles the player using the held item in the air.
    fn handle_item_use(&self, ctx: &mut EventContext) -> HandlerResult;
}

pub trait ItemUseOnBlockHandler {
    /// Handles the player using the held item on a block face.
    /// `click_pos` components are in `0.0..=1.0`.
    fn handle_item_use_on_block(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        face: Face,
        click_pos: Vec3,
    ) -> HandlerResult;
}

pub trait ItemUseOnEntityHandler {
    /// Handles the player using the held item on an entity.
    fn handle_item_use_on_entity(
        &self,
        ctx: &mut EventContext,
        entity: &EntityRef,
    ) -> HandlerResult;
}

pub trait ItemReleaseHandler {
    /// Handles the player releasing an item after using it for `duration`, e.g. a bow.
    fn handle_item_release(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
        duration: Duration,
    ) -> HandlerResult;
}

pub trait ItemConsumeHandler {
    /// Handles the player consuming an item such as food.
    fn handle_item_consume(&self, ctx: &mut EventContext, item: &ItemStack) -> HandlerResult;
}

pub trait AttackEntityHandler {
    /// Handles the player attacking an entity.
    ///
    /// Knock-back force and height and whether the hit is critical may be
    /// changed. Cancelling stops both damage and knock-back.
    fn handle_attack_entity(
        &self,
        ctx: &mut EventContext,
        entity: &EntityRef,
        force: &mut f64,
        height: &mut f64,
        critical: &mut bool,
    ) -> HandlerResult;
}

pub trait ExperienceGainHandler {
    /// Handles the player gaining experience. The amount may be changed.
    fn handle_experience_gain(&self, ctx: &mut EventContext, amount: &mut i32) -> HandlerResult;
}

pub trait PunchAirHandler {
    /// Handles the player punching air.
    fn handle_punch_air(&self, ctx: &mut EventContext) -> HandlerResult;
}

pub trait SignEditHandler {
    /// Handles the player editing one side of a sign.
    ///
    /// Called for every keystroke, so the texts usually differ by one character.
    fn handle_sign_edit(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        front_side: bool,
        old_text: &str,
        new_text: &str,
    ) -> HandlerResult;
}

pub trait LecternPageTurnHandler {
    /// Handles the player turning a page in a lectern. The new page may be changed.
    fn handle_lectern_page_turn(
        &self,
        ctx: &mut EventContext,
        pos: BlockPos,
        old_page: i32,
        new_page: &mut i32,
    ) -> HandlerResult;
}

pub trait ItemDamageHandler {
    /// Handles a held item or armour piece taking `damage` through use.
    fn handle_item_damage(
        &self,
        ctx: &mut EventContext,
        item: &ItemStack,
        damage: i32,
    ) -> HandlerResult;
}

pub trait ItemPickupHandler {
    /// Handles the player picking up an item from the ground. The stack may be changed.
    fn handle_item_pickup(&self, ctx: &mut EventContext, item: &mut ItemStack) -> HandlerResult;
}

pub trait HeldSlotChangeHandler {
    /// Handles the player switching hotbar slots.
    fn handle_held_slot_change(
        &self,
        ctx: &mut EventContext,
        from: usize,
        to: usize,
    ) -> HandlerResult;
}

pub trait ItemDropHandler {
    /// Handles the player dropping an item on the ground.
    fn handle_item_drop(&self, ctx: &mut EventContext, item: &ItemStack) -> HandlerResult;
}

pub trait TransferHandler {
    /// Handles the player being transferred to another server. The target address may be changed.
    fn handle_transfer(&self, ctx: &mut EventContext, addr: &mut SocketAddr) -> HandlerResult;
}

pub trait CommandExecutionHandler {
    /// Handles the player running a command. Cancelling stops the command from executing.
    fn handle_command_execution(
        &self,
        ctx: &mut EventContext,
        command: &CommandRef,
        args: &[String],
    ) -> HandlerResult;
}

pub trait QuitHandler {
    /// Handles the player leaving. Always called on disconnect, whatever the reason.
    fn handle_quit(&self) -> HandlerResult;
}

pub trait DiagnosticsHandler {
    /// Handles diagnostics periodically reported by the client.
    fn handle_diagnostics(&self, diagnostics: &Diagnostics) -> HandlerResult;
}

// ============================================================================
// Kinds and subscriber accessors
// ============================================================================

macro_rules! capabilities {
    ($($kind:ident => $accessor:ident: $handler:ident),* $(,)?) => {
        /// Identifies the category of a player event.
        ///
        /// Each kind maps to exactly one handler trait.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EventKind {
            $($kind,)*
        }

        impl EventKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [EventKind] = &[$(EventKind::$kind,)*];

            /// Number of kinds in the taxonomy.
            pub const COUNT: usize = EventKind::ALL.len();

            /// Stable name of the kind.
            pub const fn name(self) -> &'static str {
                match self {
                    $(EventKind::$kind => stringify!($kind),)*
                }
            }

            /// Name of the handler trait a subscriber implements for this kind.
            pub const fn handler_trait(self) -> &'static str {
                match self {
                    $(EventKind::$kind => stringify!($handler),)*
                }
            }
        }

        /// An object that can be registered with a [`HandlerRegistry`](crate::HandlerRegistry).
        ///
        /// Every accessor defaults to `None`; a subscriber overrides the ones for
        /// the kinds it handles, usually through the
        /// [`subscriber!`](crate::subscriber) macro. Accessors must answer the
        /// same way for the lifetime of the subscriber.
        pub trait Subscriber: Send + Sync + 'static {
            /// Name used in logs and errors.
            fn subscriber_name(&self) -> &str {
                std::any::type_name::<Self>()
            }

            $(
                #[doc = concat!("Returns this subscriber as a [`", stringify!($handler), "`] when it handles `", stringify!($kind), "` events.")]
                fn $accessor(&self) -> Option<&dyn $handler> {
                    None
                }
            )*
        }

        /// Tests whether `subscriber` implements the capability for `kind`.
        pub fn supports(subscriber: &dyn Subscriber, kind: EventKind) -> bool {
            match kind {
                $(EventKind::$kind => subscriber.$accessor().is_some(),)*
            }
        }
    };
}

capabilities! {
    Move => as_move_handler: MoveHandler,
    Jump => as_jump_handler: JumpHandler,
    Teleport => as_teleport_handler: TeleportHandler,
    ChangeWorld => as_change_world_handler: ChangeWorldHandler,
    ToggleSprint => as_toggle_sprint_handler: ToggleSprintHandler,
    ToggleSneak => as_toggle_sneak_handler: ToggleSneakHandler,
    Chat => as_chat_handler: ChatHandler,
    FoodLoss => as_food_loss_handler: FoodLossHandler,
    Heal => as_heal_handler: HealHandler,
    Hurt => as_hurt_handler: HurtHandler,
    Death => as_death_handler: DeathHandler,
    Respawn => as_respawn_handler: RespawnHandler,
    SkinChange => as_skin_change_handler: SkinChangeHandler,
    FireExtinguish => as_fire_extinguish_handler: FireExtinguishHandler,
    StartBreak => as_start_break_handler: StartBreakHandler,
    BlockBreak => as_block_break_handler: BlockBreakHandler,
    BlockPlace => as_block_place_handler: BlockPlaceHandler,
    BlockPick => as_block_pick_handler: BlockPickHandler,
    ItemUse => as_item_use_handler: ItemUseHandler,
    ItemUseOnBlock => as_item_use_on_block_handler: ItemUseOnBlockHandler,
    ItemUseOnEntity => as_item_use_on_entity_handler: ItemUseOnEntityHandler,
    ItemRelease => as_item_release_handler: ItemReleaseHandler,
    ItemConsume => as_item_consume_handler: ItemConsumeHandler,
    AttackEntity => as_attack_entity_handler: AttackEntityHandler,
    ExperienceGain => as_experience_gain_handler: ExperienceGainHandler,
    PunchAir => as_punch_air_handler: PunchAirHandler,
    SignEdit => as_sign_edit_handler: SignEditHandler,
    LecternPageTurn => as_lectern_page_turn_handler: LecternPageTurnHandler,
    ItemDamage => as_item_damage_handler: ItemDamageHandler,
    ItemPickup => as_item_pickup_handler: ItemPickupHandler,
    HeldSlotChange => as_held_slot_change_handler: HeldSlotChangeHandler,
    ItemDrop => as_item_drop_handler: ItemDropHandler,
    Transfer => as_transfer_handler: TransferHandler,
    CommandExecution => as_command_execution_handler: CommandExecutionHandler,
    Quit => as_quit_handler: QuitHandler,
    Diagnostics => as_diagnostics_handler: DiagnosticsHandler,
}

impl EventKind {
    /// Position of the kind in [`EventKind::ALL`].
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Every kind `subscriber` implements, in taxonomy order.
    pub fn supported_by(subscriber: &dyn Subscriber) -> Vec<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| supports(subscriber, *kind))
            .collect()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    /// Parses a kind by name, ignoring ASCII case and underscores
    /// (`"block_break"`, `"BlockBreak"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_').collect();
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| EventError::UnknownKind(s.to_string()))
    }
}

impl TryFrom<usize> for EventKind {
    type Error = EventError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        EventKind::ALL
            .get(index)
            .copied()
            .ok_or_else(|| EventError::UnknownKind(index.to_string()))
    }
}

/// Implements [`Subscriber`] for a type, exposing the listed capabilities.
///
/// Capabilities are named by their [`EventKind`]; the type must implement the
/// matching handler trait for each one.
///
/// ```rust
/// use handler_system::{subscriber, EventContext, HandlerResult, PunchAirHandler};
///
/// struct Puncher;
///
/// impl PunchAirHandler for Puncher {
///     fn handle_punch_air(&self, _ctx: &mut EventContext) -> HandlerResult {
///         Ok(())
///     }
/// }
///
/// subscriber!(Puncher: PunchAir);
/// ```
#[macro_export]
macro_rules! subscriber {
    ($ty:ty : $($capability:ident),+ $(,)?) => {
        impl $crate::Subscriber for $ty {
            $($crate::capability_accessor!($capability);)+
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! capability_accessor {
    (Move) => { fn as_move_handler(&self) -> ::core::option::Option<&dyn $crate::MoveHandler> { ::core::option::Option::Some(self) } };
    (Jump) => { fn as_jump_handler(&self) -> ::core::option::Option<&dyn $crate::JumpHandler> { ::core::option::Option::Some(self) } };
    (Teleport) => { fn as_teleport_handler(&self) -> ::core::option::Option<&dyn $crate::TeleportHandler> { ::core::option::Option::Some(self) } };
    (ChangeWorld) => { fn as_change_world_handler(&self) -> ::core::option::Option<&dyn $crate::ChangeWorldHandler> { ::core::option::Option::Some(self) } };
    (ToggleSprint) => { fn as_toggle_sprint_handler(&self) -> ::core::option::Option<&dyn $crate::ToggleSprintHandler> { ::core::option::Option::Some(self) } };
    (ToggleSneak) => { fn as_toggle_sneak_handler(&self) -> ::core::option::Option<&dyn $crate::ToggleSneakHandler> { ::core::option::Option::Some(self) } };
    (Chat) => { fn as_chat_handler(&self) -> ::core::option::Option<&dyn $crate::ChatHandler> { ::core::option::Option::Some(self) } };
    (FoodLoss) => { fn as_food_loss_handler(&self) -> ::core::option::Option<&dyn $crate::FoodLossHandler> { ::core::option::Option::Some(self) } };
    (Heal) => { fn as_heal_handler(&self) -> ::core::option::Option<&dyn $crate::HealHandler> { ::core::option::Option::Some(self) } };
    (Hurt) => { fn as_hurt_handler(&self) -> ::core::option::Option<&dyn $crate::HurtHandler> { ::core::option::Option::Some(self) } };
    (Death) => { fn as_death_handler(&self) -> ::core::option::Option<&dyn $crate::DeathHandler> { ::core::option::Option::Some(self) } };
    (Respawn) => { fn as_respawn_handler(&self) -> ::core::option::Option<&dyn $crate::RespawnHandler> { ::core::option::Option::Some(self) } };
    (SkinChange) => { fn as_skin_change_handler(&self) -> ::core::option::Option<&dyn $crate::SkinChangeHandler> { ::core::option::Option::Some(self) } };
    (FireExtinguish) => { fn as_fire_extinguish_handler(&self) -> ::core::option::Option<&dyn $crate::FireExtinguishHandler> { ::core::option::Option::Some(self) } };
    (StartBreak) => { fn as_start_break_handler(&self) -> ::core::option::Option<&dyn $crate::StartBreakHandler> { ::core::option::Option::Some(self) } };
    (BlockBreak) => { fn as_block_break_handler(&self) -> ::core::option::Option<&dyn $crate::BlockBreakHandler> { ::core::option::Option::Some(self) } };
    (BlockPlace) => { fn as_block_place_handler(&self) -> ::core::option::Option<&dyn $crate::BlockPlaceHandler> { ::core::option::Option::Some(self) } };
    (BlockPick) => { fn as_block_pick_handler(&self) -> ::core::option::Option<&dyn $crate::BlockPickHandler> { ::core::option::Option::Some(self) } };
    (ItemUse) => { fn as_item_use_handler(&self) -> ::core::option::Option<&dyn $crate::ItemUseHandler> { ::core::option::Option::Some(self) } };
    (ItemUseOnBlock) => { fn as_item_use_on_block_handler(&self) -> ::core::option::Option<&dyn $crate::ItemUseOnBlockHandler> { ::core::option::Option::Some(self) } };
    (ItemUseOnEntity) => { fn as_item_use_on_entity_handler(&self) -> ::core::option::Option<&dyn $crate::ItemUseOnEntityHandler> { ::core::option::Option::Some(self) } };
    (ItemRelease) => { fn as_item_release_handler(&self) -> ::core::option::Option<&dyn $crate::ItemReleaseHandler> { ::core::option::Option::Some(self) } };
    (ItemConsume) => { fn as_item_consume_handler(&self) -> ::core::option::Option<&dyn $crate::ItemConsumeHandler> { ::core::option::Option::Some(self) } };
    (AttackEntity) => { fn as_attack_entity_handler(&self) -> ::core::option::Option<&dyn $crate::AttackEntityHandler> { ::core::option::Option::Some(self) } };
    (ExperienceGain) => { fn as_experience_gain_handler(&self) -> ::core::option::Option<&dyn $crate::ExperienceGainHandler> { ::core::option::Option::Some(self) } };
    (PunchAir) => { fn as_punch_air_handler(&self) -> ::core::option::Option<&dyn $crate::PunchAirHandler> { ::core::option::Option::Some(self) } };
    (SignEdit) => { fn as_sign_edit_handler(&self) -> ::core::option::Option<&dyn $crate::SignEditHandler> { ::core::option::Option::Some(self) } };
    (LecternPageTurn) => { fn as_lectern_page_turn_handler(&self) -> ::core::option::Option<&dyn $crate::LecternPageTurnHandler> { ::core::option::Option::Some(self) } };
    (ItemDamage) => { fn as_item_damage_handler(&self) -> ::core::option::Option<&dyn $crate::ItemDamageHandler> { ::core::option::Option::Some(self) } };
    (ItemPickup) => { fn as_item_pickup_handler(&self) -> ::core::option::Option<&dyn $crate::ItemPickupHandler> { ::core::option::Option::Some(self) } };
    (HeldSlotChange) => { fn as_held_slot_change_handler(&self) -> ::core::option::Option<&dyn $crate::HeldSlotChangeHandler> { ::core::option::Option::Some(self) } };
    (ItemDrop) => { fn as_item_drop_handler(&self) -> ::core::option::Option<&dyn $crate::ItemDropHandler> { ::core::option::Option::Some(self) } };
    (Transfer) => { fn as_transfer_handler(&self) -> ::core::option::Option<&dyn $crate::TransferHandler> { ::core::option::Option::Some(self) } };
    (CommandExecution) => { fn as_command_execution_handler(&self) -> ::core::option::Option<&dyn $crate::CommandExecutionHandler> { ::core::option::Option::Some(self) } };
    (Quit) => { fn as_quit_handler(&self) -> ::core::option::Option<&dyn $crate::QuitHandler> { ::core::option::Option::Some(self) } };
    (Diagnostics) => { fn as_diagnostics_handler(&self) -> ::core::option::Option<&dyn $crate::DiagnosticsHandler> { ::core::option::Option::Some(self) } };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber;

    struct ChatAndQuit;

    impl ChatHandler for ChatAndQuit {
        fn handle_chat(&self, _ctx: &mut EventContext, _message: &mut String) -> HandlerResult {
            Ok(())
        }
    }

    impl QuitHandler for ChatAndQuit {
        fn handle_quit(&self) -> HandlerResult {
            Ok(())
        }
    }

    subscriber!(ChatAndQuit: Chat, Quit);

    struct Nothing;

    impl Subscriber for Nothing {}

    #[test]
    fn test_taxonomy_is_complete() {
        assert_eq!(EventKind::COUNT, 36);
        for (index, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), index);
            assert_eq!(EventKind::try_from(index).unwrap(), *kind);
            assert!(kind.handler_trait().ends_with("Handler"));
            assert!(kind.handler_trait().starts_with(kind.name()));
        }
    }

    #[test]
    fn test_supported_kinds_are_detected() {
        let sub = ChatAndQuit;
        assert_eq!(EventKind::supported_by(&sub), vec![EventKind::Chat, EventKind::Quit]);
        assert!(supports(&sub, EventKind::Chat));
        assert!(!supports(&sub, EventKind::Jump));
        assert!(EventKind::supported_by(&Nothing).is_empty());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Chat".parse::<EventKind>().unwrap(), EventKind::Chat);
        assert_eq!("block_break".parse::<EventKind>().unwrap(), EventKind::BlockBreak);
        assert_eq!("ITEMUSEONBLOCK".parse::<EventKind>().unwrap(), EventKind::ItemUseOnBlock);

        let err = "Teleportation".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, EventError::UnknownKind(ref name) if name == "Teleportation"));
        assert!(matches!(EventKind::try_from(EventKind::COUNT), Err(EventError::UnknownKind(_))));
    }

    #[test]
    fn test_subscriber_name_defaults_to_type_name() {
        assert!(ChatAndQuit.subscriber_name().ends_with("ChatAndQuit"));
    }

    #[test]
    fn test_kind_display_and_serde() {
        assert_eq!(EventKind::LecternPageTurn.to_string(), "LecternPageTurn");
        let json = serde_json::to_string(&EventKind::ItemPickup).unwrap();
        assert_eq!(json, "\"ItemPickup\"");
        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventKind::ItemPickup);
    }
}
