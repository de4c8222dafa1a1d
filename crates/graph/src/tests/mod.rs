//! Workflow tests against scripted collaborators.

mod properties;
