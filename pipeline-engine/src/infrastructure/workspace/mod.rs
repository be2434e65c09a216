// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The workspace facade (component M): a local-filesystem implementation
//! of `pipeline_domain::repositories::Workspace`.

mod local_workspace;

pub use local_workspace::LocalWorkspace;
