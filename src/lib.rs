// Copyright 2026 BadCompany
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

//! lilith-warden: the trust layer of a multi-agent assistant.
//!
//! This library guards the boundary between collaborators (routing agents,
//! LLM and tool plumbing, chat front-ends) and everything they must not leak:
//! per-service credentials, signed session tokens, user and tool input,
//! agent responses and the audit trail. Collaborators talk to a single
//! [`SecurityFacade`](engine_core::security_core::SecurityFacade).

pub mod config;
pub mod credentials;
pub mod engine;
pub mod engine_core;
pub mod utils;

pub use config::WardenConfig;
pub use engine_core::errors::WardenError;
pub use engine_core::security_core::SecurityFacade;
