/*!
 * Syscall Handlers
 * Handler bodies behind the dispatcher's routing table
 */

mod fs_handler;
mod system_handler;
