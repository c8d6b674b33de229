// Copyright 2022, The Android Open Source Project
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

//! The Hands-Free Profile headset service. This crate owns the per-device HFP
//! sessions and arbitrates, across all of them, which device may connect,
//! which device is the active audio route, and which of the three audio modes
//! (telecom call, virtual call, voice recognition) currently owns SCO.
//!
//! The native HFP stack, the telecom/audio framework and the adapter are
//! external collaborators, injected as trait objects when the service starts.

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod hfp;
pub mod logging;
pub mod utils;

pub use logging::init_logging;
