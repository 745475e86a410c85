//! End-to-end scenarios evaluating requests against full policy sets.


mod merge;
mod wildcard_priority;
