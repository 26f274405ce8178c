//! Core of the internship placement tracking platform.
//!
//! Two concerns live here: a unified identity layer that authenticates three
//! separately stored principal kinds (admins, staff, students) behind one
//! login surface and issues stateless session tokens, and the review workflow
//! that moves student applications through their fixed status lifecycle.
//! Surrounding CRUD concerns (posting management, profile editing, dashboard
//! counts, email rendering) are external collaborators of this crate.

pub mod config;
pub mod error;
pub mod identity;
pub mod telemetry;
pub mod workflows;
