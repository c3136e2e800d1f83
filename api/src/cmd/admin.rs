use clap::{Args, Subcommand};

use dms_db::object_id;

#[derive(Debug, Args)]
pub struct MakeId {
    #[clap(subcommand)]
    command: IdType,
}

#[derive(Debug, Subcommand)]
enum IdType {
    User,
    Project,
    Member,
    MemberGroup,
    Role,
    OpPermission,
}

pub fn make_id(args: MakeId) {
    let id = match args.command {
        IdType::User => object_id::UserId::new().to_string(),
        IdType::Project => object_id::ProjectId::new().to_string(),
        IdType::Member => object_id::MemberId::new().to_string(),
        IdType::MemberGroup => object_id::MemberGroupId::new().to_string(),
        IdType::Role => object_id::RoleId::new().to_string(),
        IdType::OpPermission => object_id::OpPermissionId::new().to_string(),
    };

    println!("{id}");
}
