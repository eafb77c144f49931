//! User signatures for WTN signaling
//!
//! The signaling server authenticates a publisher by the `usersig` query
//! parameter: a compressed, HMAC-SHA256 signed document binding a user id to
//! an application id and an expiry window.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


pub mod error;
pub mod sig;

pub use error::{UserSigError, UserSigResult};
pub use sig::{gen_user_sig, gen_user_sig_at, verify_user_sig, verify_user_sig_at, SigDocument};
