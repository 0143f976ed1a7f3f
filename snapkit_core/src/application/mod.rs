// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application
//!
//! The use-case layer: [`Processor`] is the single entry point that drives
//! a whole backup run by composing the infrastructure layer's walker,
//! scheduler, buffer arena, and chunk pipeline, without any of them knowing
//! about each other directly.

pub mod processor;

pub use processor::{Processor, ProcessorConfig};
