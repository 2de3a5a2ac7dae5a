//! Control-plane notifications for the rundown controller and web renderers.

use serde::{Deserialize, Serialize};

/// Opcodes understood by the rundown controller UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerOpcode {
	RundownLoad,
	RundownFocusFirst,
	RundownFocusNext,
	RundownFocusPrevious,
	RundownFocusLast,
	RundownStopAll,
	ItemPlay,
	#[serde(rename = "ItemPlayID")]
	ItemPlayId,
	ItemContinue,
	#[serde(rename = "ItemContinueID")]
	ItemContinueId,
	ItemStop,
	#[serde(rename = "ItemStopID")]
	ItemStopId,
	RundownAllStatesToStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
	First,
	Next,
	Previous,
	Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
	Play,
	Continue,
	Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerEvent {
	#[serde(rename = "APIcmd")]
	pub opcode: ControllerOpcode,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, rename = "itemID", skip_serializing_if = "Option::is_none")]
	pub item_id: Option<String>,
}

impl ControllerEvent {
	const fn bare(opcode: ControllerOpcode) -> Self {
		Self { opcode, file: None, item_id: None }
	}

	/// Open a rundown given as `<project>/<file>`. The path is passed through untouched.
	pub fn load(file: Option<String>) -> Self {
		Self { file, ..Self::bare(ControllerOpcode::RundownLoad) }
	}

	pub const fn focus(target: Focus) -> Self {
		Self::bare(match target {
			Focus::First => ControllerOpcode::RundownFocusFirst,
			Focus::Next => ControllerOpcode::RundownFocusNext,
			Focus::Previous => ControllerOpcode::RundownFocusPrevious,
			Focus::Last => ControllerOpcode::RundownFocusLast,
		})
	}

	pub const fn stop_all() -> Self {
		Self::bare(ControllerOpcode::RundownStopAll)
	}

	/// Without an ID the action targets the focused item.
	pub fn item(action: ItemAction, item_id: Option<String>) -> Self {
		let opcode = match (action, item_id.is_some()) {
			(ItemAction::Play, false) => ControllerOpcode::ItemPlay,
			(ItemAction::Play, true) => ControllerOpcode::ItemPlayId,
			(ItemAction::Continue, false) => ControllerOpcode::ItemContinue,
			(ItemAction::Continue, true) => ControllerOpcode::ItemContinueId,
			(ItemAction::Stop, false) => ControllerOpcode::ItemStop,
			(ItemAction::Stop, true) => ControllerOpcode::ItemStopId,
		};
		Self { item_id, ..Self::bare(opcode) }
	}

	/// Sets every item of the open rundown off-air in the UI.
	pub const fn all_states_to_stopped() -> Self {
		Self::bare(ControllerOpcode::RundownAllStatesToStopped)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RendererCommand {
	/// Drop every web renderer layer immediately, skipping out-animations.
	ClearAllLayers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererEvent {
	#[serde(rename = "spxcmd")]
	pub command: RendererCommand,
}

impl RendererEvent {
	pub const fn clear_all_layers() -> Self {
		Self {
			command: RendererCommand::ClearAllLayers,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
	Controller,
	Renderer,
}

/// One published message, tagged with the audience it is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "data", rename_all = "lowercase")]
pub enum Notification {
	Controller(ControllerEvent),
	Renderer(RendererEvent),
}

impl Notification {
	pub const fn audience(&self) -> Audience {
		match self {
			Self::Controller(_) => Audience::Controller,
			Self::Renderer(_) => Audience::Renderer,
		}
	}
}

impl From<ControllerEvent> for Notification {
	fn from(event: ControllerEvent) -> Self {
		Self::Controller(event)
	}
}

impl From<RendererEvent> for Notification {
	fn from(event: RendererEvent) -> Self {
		Self::Renderer(event)
	}
}
