/*
 * Responsibility
 * - HTTP surface, one module per API version
 */
pub mod v1;
