use std::fmt;
use std::str::FromStr;

use vehicle_api::CommandRequest;

/// A command the CLI can deliver to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleAction {
    Lock,
    Unlock,
    SentryOn,
    SentryOff,
}

impl VehicleAction {
    pub const ALL: [VehicleAction; 4] = [
        VehicleAction::Lock,
        VehicleAction::Unlock,
        VehicleAction::SentryOn,
        VehicleAction::SentryOff,
    ];

    pub fn command(self) -> CommandRequest {
        match self {
            Self::Lock => CommandRequest::door_lock(),
            Self::Unlock => CommandRequest::door_unlock(),
            Self::SentryOn => CommandRequest::set_sentry_mode(true),
            Self::SentryOff => CommandRequest::set_sentry_mode(false),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lock => "Lock Doors",
            Self::Unlock => "Unlock Doors",
            Self::SentryOn => "Sentry Mode ON",
            Self::SentryOff => "Sentry Mode OFF",
        }
    }

    pub fn in_progress_message(self) -> &'static str {
        match self {
            Self::Lock => "Locking doors...",
            Self::Unlock => "Unlocking doors...",
            Self::SentryOn => "Enabling Sentry Mode...",
            Self::SentryOff => "Disabling Sentry Mode...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Lock => "Doors locked successfully!",
            Self::Unlock => "Doors unlocked successfully!",
            Self::SentryOn => "Sentry Mode enabled!",
            Self::SentryOff => "Sentry Mode disabled!",
        }
    }
}

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Action(VehicleAction),
    Wake,
    Quit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::Action(VehicleAction::Lock),
        MenuChoice::Action(VehicleAction::Unlock),
        MenuChoice::Action(VehicleAction::SentryOn),
        MenuChoice::Action(VehicleAction::SentryOff),
        MenuChoice::Wake,
        MenuChoice::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Action(action) => action.label(),
            Self::Wake => "Wake Vehicle",
            Self::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChoice(pub String);

impl fmt::Display for InvalidChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid choice '{}'. Please enter 1-{}.",
            self.0,
            MenuChoice::ALL.len()
        )
    }
}

impl std::error::Error for InvalidChoice {}

impl FromStr for MenuChoice {
    type Err = InvalidChoice;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        trimmed
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| InvalidChoice(trimmed.to_string()))
    }
}

/// The numbered menu followed by the input prompt.
pub fn menu_text() -> String {
    let mut text = String::from("What would you like to do?\n");
    for (index, choice) in MenuChoice::ALL.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", index + 1, choice.label()));
    }
    text.push_str(&format!("\nEnter choice [1-{}]: ", MenuChoice::ALL.len()));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_map_to_choices() {
        assert_eq!("1".parse::<MenuChoice>(), Ok(MenuChoice::Action(VehicleAction::Lock)));
        assert_eq!(" 4\n".parse::<MenuChoice>(), Ok(MenuChoice::Action(VehicleAction::SentryOff)));
        assert_eq!("5".parse::<MenuChoice>(), Ok(MenuChoice::Wake));
        assert_eq!("6".parse::<MenuChoice>(), Ok(MenuChoice::Quit));
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        for input in ["0", "7", "", "lock", "-1"] {
            assert!(input.parse::<MenuChoice>().is_err(), "{input:?} should be rejected");
        }
        assert_eq!(
            "9".parse::<MenuChoice>().unwrap_err().to_string(),
            "Invalid choice '9'. Please enter 1-6."
        );
    }

    #[test]
    fn actions_build_their_commands() {
        assert_eq!(VehicleAction::Lock.command().name(), "door_lock");
        assert_eq!(VehicleAction::Unlock.command().name(), "door_unlock");
        assert_eq!(
            VehicleAction::SentryOff.command().body(),
            serde_json::json!({ "on": false })
        );
    }

    #[test]
    fn menu_lists_every_choice_in_order() {
        assert_eq!(
            menu_text(),
            "What would you like to do?\n\
             1. Lock Doors\n\
             2. Unlock Doors\n\
             3. Sentry Mode ON\n\
             4. Sentry Mode OFF\n\
             5. Wake Vehicle\n\
             6. Quit\n\
             \nEnter choice [1-6]: "
        );
    }
}
