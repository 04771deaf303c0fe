//! eventlens backend on top of a Supabase project.
//!
//! Events and media rows live in PostgREST tables (`events`, `media`),
//! passwords are checked by the `validate_event_password` RPC, and files are
//! kept in a private storage bucket that hands out signed URLs.

mod client;

pub use client::SupabaseClient;
