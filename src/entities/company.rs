// 🏢 Managing companies ("gestores") and their personnel rosters
//
// Fixed lookup table, built once at startup. Config may replace it, but it
// never changes while the session runs.

use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// One managing company and the agents that may act for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub agents: Vec<String>,
}

impl Company {
    pub fn new(name: &str, agents: &[&str]) -> Self {
        Company {
            name: name.to_string(),
            agents: agents.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn has_agent(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a == agent)
    }
}

/// Registry of companies, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    companies: Vec<Company>,
}

impl Roster {
    /// The two companies working this development
    pub fn new() -> Self {
        Roster {
            companies: vec![
                Company::new(
                    "VALLENOVA",
                    &[
                        "Juan L. Herrero",
                        "Yolanda Alba",
                        "Ignacio Tejerina",
                        "Juan L. Blanco",
                        "Liliam Arroyo",
                    ],
                ),
                Company::new(
                    "PROMOTOR",
                    &[
                        "Pedro Zalama Casanova",
                        "Pedro Zalama Hernández",
                        "José Miguel Velasco",
                    ],
                ),
            ],
        }
    }

    /// Build from a configured company list, keeping its order
    pub fn from_companies(companies: Vec<Company>) -> Self {
        Roster { companies }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn names(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    /// Agents for a company; empty when the company is unknown or blank
    pub fn agents_for(&self, company: &str) -> &[String] {
        self.get(company).map(|c| c.agents.as_slice()).unwrap_or(&[])
    }

    /// Check a (company, agent) pair. Blank values are always accepted.
    pub fn validate(&self, company: &str, agent: &str) -> Result<()> {
        if company.is_empty() {
            if agent.is_empty() {
                return Ok(());
            }
            return Err(InventoryError::AgentNotInRoster {
                agent: agent.to_string(),
                company: String::new(),
            });
        }

        let entry = self
            .get(company)
            .ok_or_else(|| InventoryError::UnknownCompany(company.to_string()))?;

        if !agent.is_empty() && !entry.has_agent(agent) {
            return Err(InventoryError::AgentNotInRoster {
                agent: agent.to_string(),
                company: company.to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}
