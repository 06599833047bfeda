//! # Testes do Subsistema de Memória
//!
//! Testes de host do gerenciador de frames. Cada arquivo cobre uma área:
//! - `mock.rs` - Fixtures: RAM falsa, MMU por software, swap gravado
//! - `pfm_test.rs` - Aquisição por page fault, release, pin
//! - `reclaim_test.rs` - CLOCK e eviction (swap-out, descarte, esgotamento)
//! - `stack_test.rs` - Crescimento de stack
//! - `swap_test.rs` - Área de swap e pool bruto
//! - `smp_test.rs` - Vários CPUs disputando o mesmo pool

mod mock;

mod reclaim_test;
