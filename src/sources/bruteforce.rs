// src/sources/bruteforce.rs
use crate::bruteforce::Bruteforcer;
use crate::sources::{FetchContext, Source, BRUTEFORCE};
use crate::types::{Domain, SourceInfo, SubScoutError};
use async_trait::async_trait;
use std::sync::Arc;

/// Active DNS probing of `word.domain` for every word in the list
#[derive(Clone)]
pub struct BruteforceSource {
    name: String,
    prober: Arc<Bruteforcer>,
    wordlist: Arc<Vec<String>>,
}

impl BruteforceSource {
    pub fn new(prober: Arc<Bruteforcer>, wordlist: Arc<Vec<String>>) -> Self {
        Self {
            name: BRUTEFORCE.to_string(),
            prober,
            wordlist,
        }
    }

    pub fn describe() -> SourceInfo {
        SourceInfo {
            name: BRUTEFORCE.to_string(),
            description: "DNS bruteforce over a wordlist (A, AAAA, CNAME, DNSKEY, MX, TXT)".to_string(),
            is_default: false,
            active: true,
        }
    }
}

#[async_trait]
impl Source for BruteforceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> SourceInfo {
        Self::describe()
    }

    async fn fetch(&self, domain: &Domain, ctx: &FetchContext<'_>) -> Result<Vec<String>, SubScoutError> {
        let found = self
            .prober
            .probe(domain, &self.wordlist, ctx.sink, ctx.cancel)
            .await?;
        Ok(found.into_iter().collect())
    }
}
