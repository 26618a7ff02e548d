pub mod daemon;
pub mod member_activate;
pub mod member_invite;
pub mod member_read;
pub mod member_remove;
pub mod rubbish_delete;
pub mod rubbish_list;
pub mod rubbish_recover;
