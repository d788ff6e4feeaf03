mod best_effort;
mod dry_run;
mod idempotence;
mod malformed;
