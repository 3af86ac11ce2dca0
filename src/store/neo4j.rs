//! Bolt-backed store
//!
//! Each write runs as one explicit transaction that is committed only after
//! the whole statement ran, so a failure or timeout mid-write leaves nothing
//! behind; a failed statement is rolled back before the call is retried.
//! Commit is not retried: its outcome is unknown after a fault.

use crate::compiler::cypher::{self, ANSWER};
use crate::compiler::Pattern;
use crate::connection::Neo4jClient;
use crate::error::Result;
use crate::store::{GraphStore, ReadRequest};
use async_trait::async_trait;
use tracing::{debug, warn};

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn write(&self, pattern: &Pattern) -> Result<()> {
        let statement = cypher::render_write(pattern)?;
        debug!(cypher = %statement.text, params = statement.params.len(), "Executing write");

        let statement = &statement;
        let txn = self
            .with_retry("write", || async move {
                let mut txn = self.deadline("begin transaction", self.graph().start_txn()).await?;
                match self.deadline("write", txn.run(statement.to_query())).await {
                    Ok(()) => Ok(txn),
                    Err(e) => {
                        // release the connection clean before any retry
                        if let Err(rollback) = self.deadline("rollback", txn.rollback()).await {
                            warn!("Rollback after failed write also failed: {}", rollback);
                        }
                        Err(e)
                    }
                }
            })
            .await?;

        self.deadline("commit", txn.commit()).await
    }

    async fn read(&self, request: &ReadRequest) -> Result<Vec<String>> {
        let statement = cypher::render_read(request)?;
        debug!(cypher = %statement.text, params = statement.params.len(), "Executing read");

        let statement = &statement;
        self.with_retry("read", || async move {
            let mut rows = self
                .deadline("read", self.graph().execute(statement.to_query()))
                .await?;

            let mut answers = Vec::new();
            while let Some(row) = self.deadline("fetch row", rows.next()).await? {
                // a null property yields no answer
                if let Ok(answer) = row.get::<String>(ANSWER) {
                    answers.push(answer);
                }
            }
            Ok(answers)
        })
        .await
    }
}
