//! Names of the built-in screen markers and buttons.
//!
//! Each name is the file stem of a PNG in the template directory.

/// "Attack" button: the command phase is waiting for input
pub const ATTACK: &str = "attack";
/// Bond screen shown when the battle is won
pub const BOND: &str = "bond";
/// Back button visible while choosing command cards
pub const CARD_SELECTION: &str = "battleBack";
/// Prompt to choose the target servant of a skill
pub const CHOOSE_TARGET: &str = "choose_object";
/// Order-change dialog before both members are chosen
pub const ORDER_CHANGE: &str = "change_disabled";
/// Order-change confirmation button
pub const ORDER_CHANGE_CONFIRM: &str = "change";

/// Quest entry with enough AP, standard quest
pub const ENTRY_SUPPORT: &str = "friend_pick";
/// Quest entry with enough AP, storm-call quest (extra confirmation)
pub const ENTRY_CONFIRM: &str = "quest_start";
/// Quest entry without enough AP, standard quest
pub const ENTRY_AP_STANDARD: &str = "ap_regen";
/// Quest entry without enough AP, storm-call quest
pub const ENTRY_AP_STORM: &str = "recover_ap";
/// Confirm button of the AP recovery dialog
pub const AP_CONFIRM: &str = "decide";

/// Support list has finished loading
pub const SUPPORT_LIST: &str = "view_friend_party";
/// Support list is empty
pub const NO_SUPPORT: &str = "noSupport";
/// Start button on the team confirmation screen
pub const START_QUEST: &str = "start_quest";

/// "Next" button on the result screen
pub const NEXT_STEP: &str = "next_step";
/// Decline sending a friend request
pub const DECLINE_FRIEND: &str = "not_apply";
/// Repeat the same quest
pub const CONTINUE: &str = "continue_battle";
/// Close the result screen
pub const CLOSE: &str = "close";
/// Main menu button on the quest map
pub const MENU: &str = "menu";

/// Logical name of the target quest thumbnail
pub const QUEST: &str = "quest";

/// Logical name of the `index`-th acceptable support image
pub fn support(index: usize) -> String {
    format!("support_{}", index)
}

/// Wave indicator for `stage` of `stage_count`, e.g. `2_3`
pub fn stage(stage: u32, stage_count: u32) -> String {
    format!("{}_{}", stage, stage_count)
}
