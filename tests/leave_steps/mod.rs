//! Step definitions for leave workflow BDD scenarios.
