//! RoomHub API - room lifecycle service for multiplayer games
//!
//! This crate provides the RPC-style surface for the room system:
//! - Room creation, joining and leaving (with host migration)
//! - Ready-check coordination
//! - Relayed per-player game state during play
//! - Match result compilation at game end

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
