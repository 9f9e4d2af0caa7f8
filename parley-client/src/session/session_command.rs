/// Commands from the [`SessionController`](crate::SessionController) to its running session.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Stop,
}
