//! Command translation and routing for a broadcast graphics playout relay.
//!
//! Inbound control requests are normalized into a [`PlayoutCommand`] for the
//! playout backend or a [`ControllerEvent`] for the rundown controller UI, and
//! handed to the [`DispatchRouter`]. Every send is one-way: the router never
//! waits for the backend or the controller to confirm anything.
//!
//! # Modules
//!
//! - [`envelope`] - builders for invoke, direct-content and by-reference commands
//! - [`event`] - controller and renderer notifications
//! - [`router`] - routing and the panic fan-out
//! - [`hub`] / [`outbound`] - in-process notification fan-out and backend queue
//! - [`rundown`] / [`identity`] - rundown documents and conflict-checked item renames

mod de;

pub mod envelope;
pub mod error;
pub mod event;
pub mod hub;
pub mod identity;
pub mod outbound;
pub mod router;
pub mod rundown;
pub mod sink;

pub use envelope::{
	build_by_reference, build_direct, build_invoke, rundown_path, Addressing, AddressingParams, DataField, DirectPlayoutRequest, Directive, InvokeParams, ItemReference,
	PlayAction, PlayoutCommand,
};
pub use error::{AddressingError, DeliveryError, DocumentError, IdentityError};
pub use event::{Audience, ControllerEvent, ControllerOpcode, Focus, ItemAction, Notification, RendererEvent};
pub use hub::EventHub;
pub use identity::{IdentityResolver, RenameOutcome, RenameRequest};
pub use outbound::{run_outbound_worker, Outbound, OutboundHandler, OutboundQueue, OutboundReceiver, DEFAULT_PLAYOUT_QUEUE};
pub use router::{DispatchRouter, PanicReport};
pub use rundown::{CachedRundown, DocumentStore, FsDocumentStore, RundownCache, RundownDocument, RundownItem};
pub use sink::{BackendControl, NotificationSink, PlayoutSink};
