use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    acct, cdup, cwd, digest, feat, help, list, mdtm, mlst, noop, opts, pass, pwd, quit, rein,
    retr, size, stor, stru, syst, type_, user, CommandContext, CommandOutcome,
};
use crate::core_network::{pasv, port};
use crate::session::AuthState;

/// Dispatches one parsed command, wrapped in the hook callbacks. The caller
/// (the control loop) turns the outcome or error into wire replies.
pub async fn dispatch(
    ctx: &mut CommandContext<'_>,
    verb: FtpCommand,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    ctx.hooks.before_run_command(ctx.session, verb, arg);
    let result = run(ctx, verb, arg).await;
    match &result {
        Ok(outcome) => ctx
            .hooks
            .after_run_command_ok(ctx.session, verb, outcome.code()),
        Err(error) => ctx.hooks.after_run_command_ko(ctx.session, verb, error),
    }
    result
}

async fn run(
    ctx: &mut CommandContext<'_>,
    verb: FtpCommand,
    arg: &str,
) -> Result<CommandOutcome, FtpError> {
    // An intermediate reply pins the next verb. QUIT is always allowed
    // through so a confused client can still leave, and USER may restart
    // a pending login handshake since it clears any prior authentication.
    if let Some(expected) = ctx.session.expected_next {
        let restarts_login = verb == FtpCommand::USER
            && matches!(expected, FtpCommand::PASS | FtpCommand::ACCT);
        if verb != expected && verb != FtpCommand::QUIT && !restarts_login {
            return Err(out_of_sequence(ctx, expected));
        }
        ctx.session.expected_next = None;
    }
    if !verb.allowed_before_login() && !ctx.session.auth.is_authenticated() {
        return Err(FtpError::NotAuthenticated);
    }

    match verb {
        FtpCommand::USER => user::handle_user_command(ctx, arg).await,
        FtpCommand::PASS => pass::handle_pass_command(ctx, arg).await,
        FtpCommand::ACCT => acct::handle_acct_command(ctx, arg).await,
        FtpCommand::REIN => rein::handle_rein_command(ctx, arg).await,
        FtpCommand::QUIT => quit::handle_quit_command(ctx, arg).await,
        FtpCommand::NOOP => noop::handle_noop_command(ctx, arg).await,
        FtpCommand::SYST => syst::handle_syst_command(ctx, arg).await,
        FtpCommand::HELP => help::handle_help_command(ctx, arg).await,
        FtpCommand::FEAT => feat::handle_feat_command(ctx, arg).await,
        FtpCommand::OPTS => opts::handle_opts_command(ctx, arg).await,
        FtpCommand::TYPE => type_::handle_type_command(ctx, arg).await,
        FtpCommand::STRU => stru::handle_stru_command(ctx, arg).await,
        FtpCommand::PWD => pwd::handle_pwd_command(ctx, arg).await,
        FtpCommand::CWD => cwd::handle_cwd_command(ctx, arg).await,
        FtpCommand::CDUP => cdup::handle_cdup_command(ctx, arg).await,
        FtpCommand::PORT => port::handle_port_command(ctx, arg).await,
        FtpCommand::EPRT => port::handle_eprt_command(ctx, arg).await,
        FtpCommand::PASV => pasv::handle_pasv_command(ctx, arg).await,
        FtpCommand::EPSV => pasv::handle_epsv_command(ctx, arg).await,
        FtpCommand::LIST | FtpCommand::NLST | FtpCommand::MLSD => {
            list::handle_list_command(ctx, verb, arg).await
        }
        FtpCommand::MLST => mlst::handle_mlst_command(ctx, arg).await,
        FtpCommand::SIZE => size::handle_size_command(ctx, arg).await,
        FtpCommand::MDTM => mdtm::handle_mdtm_command(ctx, arg).await,
        FtpCommand::XCRC | FtpCommand::XMD5 | FtpCommand::XSHA1 => {
            digest::handle_digest_command(ctx, verb, arg).await
        }
        FtpCommand::RETR => retr::handle_retr_command(ctx, arg).await,
        FtpCommand::STOR | FtpCommand::APPE | FtpCommand::STOU => {
            stor::handle_store_command(ctx, verb, arg).await
        }
    }
}

/// The wrong verb arrived after an intermediate reply. Inside the login
/// handshake (PASS or ACCT pending) this aborts the handshake outright;
/// elsewhere the session insists on a NOOP before anything else runs.
fn out_of_sequence(ctx: &mut CommandContext<'_>, expected: FtpCommand) -> FtpError {
    if matches!(expected, FtpCommand::PASS | FtpCommand::ACCT) {
        ctx.session.auth = AuthState::NotLoggedIn;
        ctx.session.expected_next = None;
    } else {
        ctx.session.expected_next = Some(FtpCommand::NOOP);
    }
    FtpError::BadSequence
}
