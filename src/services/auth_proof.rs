// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in authentication proof.
//!
//! The only shipped verifier is the placeholder PIN policy: any PIN of the
//! configured length made of ASCII digits is accepted. A real mechanism
//! (device attestation, TOTP) plugs in behind the same trait.

use crate::models::User;

/// Capability deciding whether a submitted proof authenticates a student.
pub trait AuthProofVerifier: Send + Sync {
    fn verify(&self, student: &User, proof: &str) -> bool;
}

/// Placeholder PIN policy: fixed length, digits only.
#[derive(Debug, Clone)]
pub struct PinVerifier {
    pin_length: usize,
}

impl PinVerifier {
    pub fn new(pin_length: usize) -> Self {
        Self { pin_length }
    }
}

impl AuthProofVerifier for PinVerifier {
    fn verify(&self, _student: &User, proof: &str) -> bool {
        proof.len() == self.pin_length && proof.bytes().all(|b| b.is_ascii_digit())
    }
}
