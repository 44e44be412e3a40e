#![forbid(unsafe_code)]

//! Optional collaborators for a snapdeck page.
//!
//! Everything here is gated behind a feature so a page that only wants
//! scroll orchestration pulls in nothing extra:
//!
//! | Feature  | Module           | What it adds                                  |
//! |----------|------------------|-----------------------------------------------|
//! | `popups` | [`popup_trail`]  | Error-popup cascade shown while locked down   |
//! | `banner` | [`banner`]       | Rotating banner with pointer/tilt parallax    |
//! | `media`  | [`media`]        | Playlist music player that obeys pause signals |
//!
//! Enable `logging` to route log lines through `tracing` when no other crate
//! in the build already does.

pub mod rng;

#[cfg(feature = "banner")]
pub mod banner;
#[cfg(feature = "media")]
pub mod media;
#[cfg(feature = "popups")]
pub mod popup_trail;

pub use rng::XorShift64;
