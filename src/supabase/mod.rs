// src/supabase/mod.rs
//! Remote relational store (Supabase / PostgREST)

mod client;
mod types;

pub use client::SupabaseClient;
pub use types::*;
