//! Domain entities for the menu preferences panel.
//!
//! This module contains pure business rules with no infrastructure
//! dependencies.  The application layer (in the `menu-prefs` crate) combines
//! these types with a preference store and a notification sink; the domain
//! never depends on either.

/// Menu highlight color and its `"R G B"` text encoding.
pub mod color;

/// Menu show delay in milliseconds.
pub mod delay;

/// Persisted locations and value names.
pub mod location;

/// Shell "settings changed" notification constants.
pub mod notification;
